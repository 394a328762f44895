use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::defaults::WEBSITE;
use crate::constants::estimator::{
    DECLINING_ABOVE_MONTHS, DECLINING_SCORE, ECONOMIC_COST_PER_DAY,
    EXTENDED_DECLINING_ABOVE_MONTHS, EXTENDED_IMPROVING_BELOW_MONTHS, HUMAN_COST_PER_DAY,
    IMPROVING_BELOW_MONTHS, IMPROVING_SCORE, MANUAL_HUMAN_COST_PER_DAY, MODERATE_SCORE,
    OPPORTUNITY_COST_BUDGET_FRACTION, OPPORTUNITY_COST_PER_DAY,
};
use crate::constants::filter::{
    EXCLUDED_CATEGORIES, GTA_MAX_LAT, GTA_MAX_LON, GTA_MIN_LAT, GTA_MIN_LON, STATUS_PLANNING,
    STATUS_UNDER_CONSTRUCTION,
};
use crate::constants::schedule::{
    BUDGET_CREEP, COMPLETED_BACKDATE_DAYS, CONSTRUCTION_GAP_DAYS, DAYS_PER_MONTH,
    PLANNING_DURATION_DAYS, PLANNING_LEAD_DAYS, SLIP_MONTHS,
};
use crate::errors::PipelineError;
use crate::types::{Dollars, NormalizedValue};
use crate::utils::normalize_key;

/// Inclusive rectangular region records must fall inside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Greater Toronto Area bounds.
    pub const fn gta() -> Self {
        Self {
            min_lat: GTA_MIN_LAT,
            max_lat: GTA_MAX_LAT,
            min_lon: GTA_MIN_LON,
            max_lon: GTA_MAX_LON,
        }
    }

    /// True when the point lies inside the box, edges included.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&longitude)
            && (self.min_lat..=self.max_lat).contains(&latitude)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::gta()
    }
}

/// How opportunity cost accrues per delay day.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum OpportunityCostPolicy {
    /// Fixed dollars per delay day.
    FlatPerDay {
        /// Dollars per day.
        rate: Dollars,
    },
    /// Fraction of the original budget per delay day.
    FractionOfBudget {
        /// Share of the budget per day, e.g. `0.0006`.
        fraction: f64,
    },
}

/// Per-day delay cost rates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    /// Dollars of economic cost per delay day.
    pub economic_rate: Dollars,
    /// Opportunity-cost accrual policy.
    pub opportunity: OpportunityCostPolicy,
    /// Dollars of human cost per delay day.
    pub human_rate: Dollars,
}

impl CostModelConfig {
    /// Flat opportunity rate with the low human-cost rate (datastore passes).
    pub const fn flat_rate() -> Self {
        Self {
            economic_rate: ECONOMIC_COST_PER_DAY,
            opportunity: OpportunityCostPolicy::FlatPerDay {
                rate: OPPORTUNITY_COST_PER_DAY,
            },
            human_rate: HUMAN_COST_PER_DAY,
        }
    }

    /// Opportunity cost as a fraction of the original budget.
    pub const fn budget_fraction() -> Self {
        Self {
            economic_rate: ECONOMIC_COST_PER_DAY,
            opportunity: OpportunityCostPolicy::FractionOfBudget {
                fraction: OPPORTUNITY_COST_BUDGET_FRACTION,
            },
            human_rate: HUMAN_COST_PER_DAY,
        }
    }

    /// Rates applied to curated manual entries.
    pub const fn manual_entry() -> Self {
        Self {
            economic_rate: ECONOMIC_COST_PER_DAY,
            opportunity: OpportunityCostPolicy::FlatPerDay {
                rate: OPPORTUNITY_COST_PER_DAY,
            },
            human_rate: MANUAL_HUMAN_COST_PER_DAY,
        }
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let opportunity = match self.opportunity {
            OpportunityCostPolicy::FlatPerDay { rate } => rate,
            OpportunityCostPolicy::FractionOfBudget { fraction } => fraction,
        };
        for (name, value) in [
            ("economic_rate", self.economic_rate),
            ("opportunity", opportunity),
            ("human_rate", self.human_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::Configuration(format!(
                    "cost model {name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self::flat_rate()
    }
}

/// Delay-month cut points and the performance score of each efficiency label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyThresholds {
    /// Delays strictly above this many months are `Declining`.
    pub declining_above_months: u32,
    /// Delays strictly below this many months are `Improving`.
    pub improving_below_months: u32,
    /// Score for `Declining`.
    pub declining_score: u32,
    /// Score for `Moderate`.
    pub moderate_score: u32,
    /// Score for `Improving`.
    pub improving_score: u32,
}

impl EfficiencyThresholds {
    /// 8/3 month cut points.
    pub const fn standard() -> Self {
        Self {
            declining_above_months: DECLINING_ABOVE_MONTHS,
            improving_below_months: IMPROVING_BELOW_MONTHS,
            declining_score: DECLINING_SCORE,
            moderate_score: MODERATE_SCORE,
            improving_score: IMPROVING_SCORE,
        }
    }

    /// 12/5 month cut points.
    pub const fn extended() -> Self {
        Self {
            declining_above_months: EXTENDED_DECLINING_ABOVE_MONTHS,
            improving_below_months: EXTENDED_IMPROVING_BELOW_MONTHS,
            ..Self::standard()
        }
    }
}

impl Default for EfficiencyThresholds {
    fn default() -> Self {
        Self::standard()
    }
}

/// Inclusive pseudo-random windows for synthesized dates and budget creep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Days before today that a completed project with a future date is moved to.
    pub completed_backdate_days: (i64, i64),
    /// Months added to the original completion of unfinished projects.
    pub slip_months: (i64, i64),
    /// Days counted per slip month.
    pub days_per_month: i64,
    /// Days from planning start to original completion.
    pub planning_lead_days: (i64, i64),
    /// Length of planning in days.
    pub planning_duration_days: (i64, i64),
    /// Days from planning completion to construction start.
    pub construction_gap_days: (i64, i64),
    /// Dollars added to the original budget.
    pub budget_creep: (i64, i64),
}

impl ScheduleConfig {
    fn validate(&self) -> Result<(), PipelineError> {
        for (name, (low, high)) in [
            ("completed_backdate_days", self.completed_backdate_days),
            ("slip_months", self.slip_months),
            ("planning_lead_days", self.planning_lead_days),
            ("planning_duration_days", self.planning_duration_days),
            ("construction_gap_days", self.construction_gap_days),
            ("budget_creep", self.budget_creep),
        ] {
            if low < 0 || low > high {
                return Err(PipelineError::Configuration(format!(
                    "schedule window {name} must satisfy 0 <= low <= high, got [{low}, {high}]"
                )));
            }
        }
        if self.days_per_month <= 0 {
            return Err(PipelineError::Configuration(
                "schedule days_per_month must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            completed_backdate_days: COMPLETED_BACKDATE_DAYS,
            slip_months: SLIP_MONTHS,
            days_per_month: DAYS_PER_MONTH,
            planning_lead_days: PLANNING_LEAD_DAYS,
            planning_duration_days: PLANNING_DURATION_DAYS,
            construction_gap_days: CONSTRUCTION_GAP_DAYS,
            budget_creep: BUDGET_CREEP,
        }
    }
}

/// Top-level pipeline configuration.
///
/// Every variation point between historical script versions lives here. Load a
/// partial JSON document with [`PipelineConfig::from_json_file`]; omitted keys keep
/// their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Statuses admitted by the record filter (matched case-insensitively).
    pub accepted_statuses: Vec<NormalizedValue>,
    /// Categories always rejected (matched case-insensitively).
    pub excluded_categories: Vec<NormalizedValue>,
    /// Geographic admission region.
    pub bounds: BoundingBox,
    /// Website used when a record has none.
    pub default_website: String,
    /// Random windows for synthesized dates and budgets.
    pub schedule: ScheduleConfig,
    /// Delay cost rates.
    pub costs: CostModelConfig,
    /// Efficiency cut points.
    pub thresholds: EfficiencyThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            accepted_statuses: vec![
                STATUS_UNDER_CONSTRUCTION.to_string(),
                STATUS_PLANNING.to_string(),
            ],
            excluded_categories: EXCLUDED_CATEGORIES
                .iter()
                .map(|category| category.to_string())
                .collect(),
            bounds: BoundingBox::default(),
            default_website: WEBSITE.to_string(),
            schedule: ScheduleConfig::default(),
            costs: CostModelConfig::default(),
            thresholds: EfficiencyThresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file, filling omitted keys from defaults, and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the accepted statuses.
    pub fn with_accepted_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.accepted_statuses = statuses.into_iter().map(normalize_key).collect();
        self
    }

    /// True when `status` (already normalized) is admitted.
    pub fn accepts_status(&self, status: &str) -> bool {
        self.accepted_statuses
            .iter()
            .any(|accepted| normalize_key(accepted) == status)
    }

    /// True when `category` (already normalized) is excluded.
    pub fn excludes_category(&self, category: &str) -> bool {
        self.excluded_categories
            .iter()
            .any(|excluded| normalize_key(excluded) == category)
    }

    /// Check ranges, rates, and bounds for consistency.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.accepted_statuses.is_empty() {
            return Err(PipelineError::Configuration(
                "accepted_statuses must not be empty".to_string(),
            ));
        }
        let bounds = &self.bounds;
        if !(bounds.min_lat <= bounds.max_lat && bounds.min_lon <= bounds.max_lon) {
            return Err(PipelineError::Configuration(format!(
                "bounding box is inverted: lat [{}, {}], lon [{}, {}]",
                bounds.min_lat, bounds.max_lat, bounds.min_lon, bounds.max_lon
            )));
        }
        self.schedule.validate()?;
        self.costs.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_matches_datastore_pass() {
        let config = PipelineConfig::default();
        assert!(config.accepts_status("under construction"));
        assert!(config.accepts_status("planning"));
        assert!(!config.accepts_status("complete"));
        assert!(config.excludes_category("child care"));
        assert!(config.excludes_category("health care"));
        assert!(!config.excludes_category("transit"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn accepted_statuses_are_normalized_on_builder() {
        let config = PipelineConfig::default().with_accepted_statuses(["  Complete "]);
        assert_eq!(config.accepted_statuses, vec!["complete".to_string()]);
        assert!(config.accepts_status("complete"));
    }

    #[test]
    fn bounding_box_is_inclusive() {
        let gta = BoundingBox::gta();
        assert!(gta.contains(-79.38, 43.65));
        assert!(gta.contains(GTA_MIN_LON, GTA_MAX_LAT));
        assert!(!gta.contains(-70.0, 43.65));
        assert!(!gta.contains(-79.38, 45.0));
    }

    #[test]
    fn presets_differ_only_where_scripts_differ() {
        assert_eq!(CostModelConfig::default(), CostModelConfig::flat_rate());
        assert_eq!(CostModelConfig::manual_entry().human_rate, 2000.0);
        assert_eq!(
            CostModelConfig::budget_fraction().opportunity,
            OpportunityCostPolicy::FractionOfBudget { fraction: 0.0006 }
        );
        let extended = EfficiencyThresholds::extended();
        assert_eq!(extended.declining_above_months, 12);
        assert_eq!(extended.improving_below_months, 5);
        assert_eq!(extended.moderate_score, 75);
    }

    #[test]
    fn partial_json_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "accepted_statuses": ["complete"],
                "costs": {{"opportunity": {{"policy": "fraction_of_budget", "fraction": 0.001}}}},
                "thresholds": {{"declining_above_months": 12, "improving_below_months": 5}}
            }}"#
        )
        .unwrap();
        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.accepted_statuses, vec!["complete".to_string()]);
        assert_eq!(config.bounds, BoundingBox::gta());
        assert_eq!(config.costs.economic_rate, 1000.0);
        assert_eq!(
            config.costs.opportunity,
            OpportunityCostPolicy::FractionOfBudget { fraction: 0.001 }
        );
        assert_eq!(config.thresholds, EfficiencyThresholds::extended());
    }

    #[test]
    fn invalid_schedule_window_is_rejected() {
        let mut config = PipelineConfig::default();
        config.schedule.planning_lead_days = (900, 100);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(msg) if msg.contains("planning_lead_days")));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut config = PipelineConfig::default();
        config.costs.human_rate = -1.0;
        assert!(config.validate().is_err());
    }
}
