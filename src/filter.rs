//! Record eligibility checks and core field extraction.
//!
//! Checks run in a fixed order and the first failing check decides the
//! rejection, so the same record always reports the same reason.

use serde_json::Value;

use crate::config::PipelineConfig;
use crate::constants::{defaults, fields};
use crate::data::{GeoPoint, RawRecord};
use crate::errors::{FilterReason, RecordRejection};
use crate::types::{Dollars, FieldName, NormalizedValue, ProjectName};
use crate::utils::{normalize_key, strip_numeric_decorations};

/// Funding flags copied from the source record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FundingFlags {
    /// Municipal funding.
    pub municipal: bool,
    /// Provincial funding.
    pub provincial: bool,
    /// Federal funding.
    pub federal: bool,
    /// Any other funding source.
    pub other: bool,
}

/// Fields extracted from a record that passed every filter check.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptedRecord {
    /// Name, or the default when absent.
    pub project_name: ProjectName,
    /// Description, or the default.
    pub description: String,
    /// Status text as received.
    pub status: String,
    /// Trimmed, lowercased status used by the date rules.
    pub normalized_status: NormalizedValue,
    /// Category text as received.
    pub category: String,
    /// Coordinates inside the bounding box.
    pub location: GeoPoint,
    /// Positive budget in dollars.
    pub original_budget: Dollars,
    /// Raw target-completion text, parsed later by the date deriver.
    pub target_completion: Option<String>,
    /// Street address, or the default.
    pub address: String,
    /// Postal code, or the default.
    pub postal_code: String,
    /// Project page, or the configured default.
    pub website: String,
    /// Expected outcome, or the default.
    pub result: String,
    /// Area, or the default.
    pub area: String,
    /// Region, or the default.
    pub region: String,
    /// Funding flags.
    pub funding: FundingFlags,
}

/// Decide whether `record` is eligible under `config`.
pub fn filter_record(
    record: &RawRecord,
    config: &PipelineConfig,
) -> Result<AcceptedRecord, RecordRejection> {
    let status = record.text(fields::STATUS).unwrap_or_default();
    let normalized_status = normalize_key(&status);
    if !config.accepts_status(&normalized_status) {
        return Err(FilterReason::StatusNotAccepted {
            status: normalized_status,
        }
        .into());
    }

    let category = record.text_or(fields::CATEGORY, defaults::CATEGORY);
    let normalized_category = normalize_key(&category);
    if config.excludes_category(&normalized_category) {
        return Err(FilterReason::ExcludedCategory {
            category: normalized_category,
        }
        .into());
    }

    let budget = numeric_field(record, fields::BUDGET)?;
    if !coordinate_present(record, fields::LONGITUDE)
        || !coordinate_present(record, fields::LATITUDE)
    {
        return Err(FilterReason::MissingCoordinates.into());
    }
    let original_budget = match budget {
        Some(value) if value > 0.0 => value,
        _ => return Err(FilterReason::MissingBudget.into()),
    };

    let (Some(longitude), Some(latitude)) = (
        numeric_field(record, fields::LONGITUDE)?,
        numeric_field(record, fields::LATITUDE)?,
    ) else {
        return Err(FilterReason::MissingCoordinates.into());
    };

    if !config.bounds.contains(longitude, latitude) {
        return Err(FilterReason::OutOfBounds {
            longitude,
            latitude,
        }
        .into());
    }

    let website = record
        .text(fields::WEBSITE)
        .map(|site| site.trim().to_string())
        .unwrap_or_else(|| config.default_website.clone());

    Ok(AcceptedRecord {
        project_name: record.text_or(fields::PROJECT, defaults::PROJECT_NAME),
        description: record.text_or(fields::DESCRIPTION, defaults::DESCRIPTION),
        status: record.text_or(fields::STATUS, defaults::STATUS),
        normalized_status,
        category,
        location: GeoPoint::new(longitude, latitude),
        original_budget,
        target_completion: record.text(fields::TARGET_COMPLETION_DATE),
        address: record.text_or(fields::ADDRESS, defaults::ADDRESS),
        postal_code: record.text_or(fields::POSTAL_CODE, defaults::POSTAL_CODE),
        website,
        result: record.text_or(fields::RESULT, defaults::RESULT),
        area: record.text_or(fields::AREA, defaults::AREA),
        region: record.text_or(fields::REGION, defaults::REGION),
        funding: FundingFlags {
            municipal: record.flag(fields::MUNICIPAL_FUNDING),
            provincial: record.flag(fields::PROVINCIAL_FUNDING),
            federal: record.flag(fields::FEDERAL_FUNDING),
            other: record.flag(fields::OTHER_FUNDING),
        },
    })
}

/// A coordinate counts as present unless it is absent, null, blank, or numeric zero.
fn coordinate_present(record: &RawRecord, field: FieldName) -> bool {
    match record.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|value| value != 0.0),
        Some(_) => true,
    }
}

/// Parse a finite number from a JSON number or decorated numeric string.
///
/// Absent, null, and blank values yield `Ok(None)`.
fn numeric_field(record: &RawRecord, field: FieldName) -> Result<Option<f64>, RecordRejection> {
    let malformed = |raw: String| RecordRejection::MalformedNumeric { field, raw };
    let parsed = match record.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| malformed(number.to_string()))?,
        Some(Value::String(text)) => {
            let cleaned = strip_numeric_decorations(text);
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
                .parse::<f64>()
                .map_err(|_| malformed(text.clone()))?
        }
        Some(other) => return Err(malformed(other.to_string())),
    };
    if parsed.is_finite() {
        Ok(Some(parsed))
    } else {
        Err(malformed(parsed.to_string()))
    }
}
