//! Delay-driven efficiency labels and cost estimates.
//!
//! Formulas:
//! - `delay_days = max(0, current - original)`, `delay_months = delay_days / 30`
//! - `economic = delay_days * economic_rate`
//! - `opportunity = delay_days * rate` or `delay_days * fraction * original_budget`
//! - `human = delay_days * human_rate`
//! - `total = economic + opportunity + human`

use chrono::NaiveDate;

use crate::config::{CostModelConfig, EfficiencyThresholds, OpportunityCostPolicy, ScheduleConfig};
use crate::constants::schedule::DAYS_PER_MONTH;
use crate::data::{CostBreakdown, Efficiency};
use crate::random::RandomSource;
use crate::types::Dollars;

/// Everything the estimator derives for one project.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayEstimate {
    /// Non-negative days of delay.
    pub delay_days: u64,
    /// Label for the delay.
    pub efficiency: Efficiency,
    /// Score for `efficiency`.
    pub performance_metric: u32,
    /// Delay costs.
    pub costs: CostBreakdown,
}

/// Days between the two completion dates, clamped at zero.
pub fn delay_days(original_completion: NaiveDate, current_completion: NaiveDate) -> u64 {
    (current_completion - original_completion)
        .num_days()
        .max(0)
        .unsigned_abs()
}

/// Whole 30-day months of delay.
pub fn delay_months(delay_days: u64) -> u64 {
    delay_days / DAYS_PER_MONTH.unsigned_abs()
}

/// Efficiency label and performance score for a delay expressed in months.
pub fn classify(delay_months: u64, thresholds: &EfficiencyThresholds) -> (Efficiency, u32) {
    if delay_months > u64::from(thresholds.declining_above_months) {
        (Efficiency::Declining, thresholds.declining_score)
    } else if delay_months < u64::from(thresholds.improving_below_months) {
        (Efficiency::Improving, thresholds.improving_score)
    } else {
        (Efficiency::Moderate, thresholds.moderate_score)
    }
}

/// Linear delay cost model.
pub fn estimate_costs(
    delay_days: u64,
    original_budget: Dollars,
    model: &CostModelConfig,
) -> CostBreakdown {
    let days = delay_days as f64;
    let economic = days * model.economic_rate;
    let opportunity = match model.opportunity {
        OpportunityCostPolicy::FlatPerDay { rate } => days * rate,
        OpportunityCostPolicy::FractionOfBudget { fraction } => days * fraction * original_budget,
    };
    let human = days * model.human_rate;
    CostBreakdown {
        economic,
        opportunity,
        human,
        total: economic + opportunity + human,
    }
}

/// Delay, efficiency, and costs for a pair of completion dates.
pub fn estimate(
    original_completion: NaiveDate,
    current_completion: NaiveDate,
    original_budget: Dollars,
    thresholds: &EfficiencyThresholds,
    model: &CostModelConfig,
) -> DelayEstimate {
    let delay_days = delay_days(original_completion, current_completion);
    let (efficiency, performance_metric) = classify(delay_months(delay_days), thresholds);
    DelayEstimate {
        delay_days,
        efficiency,
        performance_metric,
        costs: estimate_costs(delay_days, original_budget, model),
    }
}

/// Original budget plus a random creep increment.
pub fn current_budget<R: RandomSource + ?Sized>(
    original_budget: Dollars,
    schedule: &ScheduleConfig,
    random: &mut R,
) -> Dollars {
    original_budget + random.in_window(schedule.budget_creep) as f64
}
