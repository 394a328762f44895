//! Completion-date parsing and milestone synthesis.

use chrono::{Datelike, Duration, NaiveDate};

use crate::config::ScheduleConfig;
use crate::constants::filter::STATUS_COMPLETE;
use crate::constants::schedule::ISO_DATE_LEN;
use crate::errors::RecordRejection;
use crate::random::RandomSource;

/// The five calendar dates attached to every project.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivedDates {
    /// Parsed target completion, backdated for completed projects.
    pub original_completion: NaiveDate,
    /// Original completion plus slippage.
    pub current_completion: NaiveDate,
    /// Start of planning.
    pub planning_start: NaiveDate,
    /// End of planning.
    pub planning_complete: NaiveDate,
    /// Start of construction.
    pub construction_start: NaiveDate,
}

/// Parse a target-completion value as `YYYY-MM-DD` (first ten characters) or as
/// day-month text such as `15-Jun`, which is anchored to `today`'s year.
///
/// Absent, blank, and unparseable values are rejected.
pub fn parse_completion_date(
    raw: Option<&str>,
    today: NaiveDate,
) -> Result<NaiveDate, RecordRejection> {
    let rejected = || RecordRejection::DateParseError {
        raw: raw.map(str::to_string),
    };
    let value = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(rejected)?;

    let iso_prefix = value
        .char_indices()
        .nth(ISO_DATE_LEN)
        .map(|(idx, _)| &value[..idx])
        .unwrap_or(value);
    if let Ok(date) = NaiveDate::parse_from_str(iso_prefix, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_day_month(value)
        .and_then(|(month, day)| NaiveDate::from_ymd_opt(today.year(), month, day))
        .ok_or_else(rejected)
}

/// Derive all milestone dates for a record.
///
/// Draw order is fixed: completed-date correction or slippage, then planning start,
/// planning completion, and construction start.
pub fn derive_dates<R: RandomSource + ?Sized>(
    raw_completion: Option<&str>,
    normalized_status: &str,
    today: NaiveDate,
    schedule: &ScheduleConfig,
    random: &mut R,
) -> Result<DerivedDates, RecordRejection> {
    let mut original_completion = parse_completion_date(raw_completion, today)?;

    let current_completion = if normalized_status == STATUS_COMPLETE {
        if original_completion > today {
            let backdate = random.in_window(schedule.completed_backdate_days);
            original_completion = shift_days(today, -backdate, "original_completion_date")?;
        }
        original_completion
    } else {
        let months = random.in_window(schedule.slip_months);
        let slip = months.checked_mul(schedule.days_per_month).ok_or(
            RecordRejection::MissingDerivedDate {
                field: "current_completion_date",
            },
        )?;
        shift_days(original_completion, slip, "current_completion_date")?
    };

    let lead = random.in_window(schedule.planning_lead_days);
    let planning_start = shift_days(original_completion, -lead, "planning_start_date")?;
    let planning = random.in_window(schedule.planning_duration_days);
    let planning_complete = shift_days(planning_start, planning, "planning_complete_date")?;
    let gap = random.in_window(schedule.construction_gap_days);
    let construction_start = shift_days(planning_complete, gap, "construction_start_date")?;

    Ok(DerivedDates {
        original_completion,
        current_completion,
        planning_start,
        planning_complete,
        construction_start,
    })
}

fn shift_days(
    date: NaiveDate,
    days: i64,
    field: &'static str,
) -> Result<NaiveDate, RecordRejection> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(RecordRejection::MissingDerivedDate { field })
}

/// Parse a `DD-Mon` string into (month, day) with basic bounds checks.
fn parse_day_month(value: &str) -> Option<(u32, u32)> {
    let mut parts = value.split('-');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = month_token_to_number(&parts.next()?.trim().to_ascii_lowercase())?;
    if parts.next().is_some() || !(1..=31).contains(&day) {
        return None;
    }
    Some((month, day))
}

/// Convert a lowercase month token to a month number (1-12).
fn month_token_to_number(token: &str) -> Option<u32> {
    match token {
        "jan" | "january" => Some(1),
        "feb" | "february" => Some(2),
        "mar" | "march" => Some(3),
        "apr" | "april" => Some(4),
        "may" => Some(5),
        "jun" | "june" => Some(6),
        "jul" | "july" => Some(7),
        "aug" | "august" => Some(8),
        "sep" | "sept" | "september" => Some(9),
        "oct" | "october" => Some(10),
        "nov" | "november" => Some(11),
        "dec" | "december" => Some(12),
        _ => None,
    }
}
