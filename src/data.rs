use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::constants::defaults::FUNDING_YES;
use crate::types::{Dollars, FieldName, ProjectName};

/// Untyped upstream record: column name to JSON value.
///
/// Fields are inconsistently present, null, numeric, or textual across records,
/// so every accessor tolerates absence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style insert used by tests and in-memory sources.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Raw JSON value for `field`.
    pub fn get(&self, field: FieldName) -> Option<&Value> {
        self.0.get(field)
    }

    /// Non-blank text rendering of `field`, untrimmed.
    pub fn text(&self, field: FieldName) -> Option<String> {
        self.get(field).and_then(value_to_text)
    }

    /// Text rendering of `field`, or `default` when absent or blank.
    pub fn text_or(&self, field: FieldName, default: &str) -> String {
        self.text(field).unwrap_or_else(|| default.to_string())
    }

    /// Funding-style flag: `"Yes"` (any case) or JSON `true`.
    pub fn flag(&self, field: FieldName) -> bool {
        match self.get(field) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.trim().eq_ignore_ascii_case(FUNDING_YES),
            _ => false,
        }
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Convert a JSON value into non-empty text when possible.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Longitude/latitude pair, serialized as a GeoJSON point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "GeoJsonPoint", try_from = "GeoJsonPoint")]
pub struct GeoPoint {
    /// Decimal degrees, east positive.
    pub longitude: f64,
    /// Decimal degrees, north positive.
    pub latitude: f64,
}

impl GeoPoint {
    /// Point at `longitude`, `latitude`.
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct GeoJsonPoint {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
}

const GEOJSON_POINT: &str = "Point";

impl From<GeoPoint> for GeoJsonPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            kind: GEOJSON_POINT.to_string(),
            coordinates: [point.longitude, point.latitude],
        }
    }
}

impl TryFrom<GeoJsonPoint> for GeoPoint {
    type Error = String;

    fn try_from(point: GeoJsonPoint) -> Result<Self, Self::Error> {
        if point.kind != GEOJSON_POINT {
            return Err(format!("expected GeoJSON type 'Point', got '{}'", point.kind));
        }
        let [longitude, latitude] = point.coordinates;
        Ok(Self::new(longitude, latitude))
    }
}

/// Qualitative schedule health derived from delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Efficiency {
    /// Delay under the improving cut point.
    Improving,
    /// Delay between the two cut points.
    Moderate,
    /// Delay over the declining cut point.
    Declining,
}

impl fmt::Display for Efficiency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Improving => "Improving",
            Self::Moderate => "Moderate",
            Self::Declining => "Declining",
        };
        f.write_str(label)
    }
}

/// Delay cost breakdown. `total` is always the sum of the other three.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CostBreakdown {
    /// Economic cost.
    pub economic: Dollars,
    /// Opportunity cost.
    pub opportunity: Dollars,
    /// Human cost.
    pub human: Dollars,
    /// Sum of the three.
    pub total: Dollars,
}

/// Normalized project document.
///
/// Built once per eligible record and never mutated afterwards. Serializes to a
/// flat JSON object with `YYYY-MM-DD` dates and a GeoJSON `location`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Display name; the deduplication key.
    pub project_name: ProjectName,
    /// Free-text description.
    pub description: String,
    /// Point inside the filter bounding box.
    pub location: GeoPoint,
    /// Target completion as published, backdated for completed projects.
    pub original_completion_date: NaiveDate,
    /// Original completion plus slippage.
    pub current_completion_date: NaiveDate,
    /// Synthesized planning start.
    pub planning_start_date: NaiveDate,
    /// Synthesized planning end.
    pub planning_complete_date: NaiveDate,
    /// Synthesized construction start.
    pub construction_start_date: NaiveDate,
    /// Status as published.
    pub status: String,
    /// Published budget in dollars.
    pub original_budget: Dollars,
    /// Original budget plus creep.
    pub current_budget: Dollars,
    /// Category as published.
    pub category: String,
    /// Expected community outcome.
    pub result: String,
    /// Municipality or area.
    pub area: String,
    /// Region.
    pub region: String,
    /// Street address.
    pub address: String,
    /// Postal code.
    pub postal_code: String,
    /// Municipal funding flag.
    pub municipal_funding: bool,
    /// Provincial funding flag.
    pub provincial_funding: bool,
    /// Federal funding flag.
    pub federal_funding: bool,
    /// Other funding flag.
    pub other_funding: bool,
    /// Project page.
    pub website: String,
    /// Label derived from the delay.
    pub efficiency: Efficiency,
    /// Score for `efficiency`.
    pub performance_metric: u32,
    /// Days between original and current completion.
    pub delay_days: u64,
    /// Economic delay cost.
    pub economic_cost: Dollars,
    /// Opportunity delay cost.
    pub opportunity_cost: Dollars,
    /// Human delay cost.
    pub human_cost: Dollars,
    /// Sum of the three delay costs.
    pub total_cost: Dollars,
}

impl Project {
    /// Cost fields as a breakdown.
    pub fn costs(&self) -> CostBreakdown {
        CostBreakdown {
            economic: self.economic_cost,
            opportunity: self.opportunity_cost,
            human: self.human_cost,
            total: self.total_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_record_text_skips_blank_and_null_values() {
        let record = RawRecord::from_value(json!({
            "Address": "   ",
            "Website": null,
            "Budget": 1000000,
            "Project": "Ontario Line"
        }))
        .unwrap();
        assert_eq!(record.text("Address"), None);
        assert_eq!(record.text("Website"), None);
        assert_eq!(record.text("Budget").as_deref(), Some("1000000"));
        assert_eq!(record.text_or("Missing", "fallback"), "fallback");
        assert_eq!(record.text_or("Project", "fallback"), "Ontario Line");
    }

    #[test]
    fn raw_record_rejects_non_objects() {
        assert!(RawRecord::from_value(json!([1, 2])).is_none());
        assert!(RawRecord::from_value(json!("text")).is_none());
    }

    #[test]
    fn funding_flags_accept_yes_and_true_only() {
        let record = RawRecord::new()
            .with("A", "Yes")
            .with("B", " yes ")
            .with("C", "No")
            .with("D", true)
            .with("E", 1);
        assert!(record.flag("A"));
        assert!(record.flag("B"));
        assert!(!record.flag("C"));
        assert!(record.flag("D"));
        assert!(!record.flag("E"));
        assert!(!record.flag("missing"));
    }

    #[test]
    fn geo_point_serializes_as_geojson() {
        let point = GeoPoint::new(-79.38, 43.65);
        let value = serde_json::to_value(point).unwrap();
        assert_eq!(value, json!({"type": "Point", "coordinates": [-79.38, 43.65]}));

        let bad = serde_json::from_value::<GeoPoint>(
            json!({"type": "Polygon", "coordinates": [0.0, 0.0]}),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn efficiency_serializes_as_label() {
        assert_eq!(
            serde_json::to_value(Efficiency::Declining).unwrap(),
            json!("Declining")
        );
        assert_eq!(Efficiency::Improving.to_string(), "Improving");
    }
}
