use std::io;

use thiserror::Error;

use crate::types::{FieldName, SourceId};

/// Error type for configuration, source, and sink failures.
///
/// Per-record problems never surface here; see [`RecordRejection`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source could not be read or decoded.
    #[error("record source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Id of the failing source.
        source_id: SourceId,
        /// What went wrong.
        reason: String,
    },
    /// Writing projects failed.
    #[error("sink failure: {0}")]
    Sink(String),
    /// Filesystem error outside a source or sink.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON encoding or decoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Invalid window, rate, or status list.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Why the record filter excluded a record.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FilterReason {
    /// Status outside the accepted set.
    #[error("status '{status}' is not accepted")]
    StatusNotAccepted {
        /// Normalized status.
        status: String,
    },
    /// Category on the exclusion list.
    #[error("category '{category}' is excluded")]
    ExcludedCategory {
        /// Normalized category.
        category: String,
    },
    /// Longitude or latitude absent or null.
    #[error("longitude or latitude is missing")]
    MissingCoordinates,
    /// Budget absent or not positive.
    #[error("budget is missing, zero, or negative")]
    MissingBudget,
    /// Point outside the configured bounding box.
    #[error("location ({longitude}, {latitude}) is outside the bounding box")]
    OutOfBounds {
        /// Record longitude.
        longitude: f64,
        /// Record latitude.
        latitude: f64,
    },
}

/// Per-record exclusion outcome. Never fatal to a batch.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RecordRejection {
    /// Excluded by the record filter.
    #[error("filtered: {0}")]
    FilterRejected(FilterReason),
    /// Target completion date absent or unparseable.
    #[error("completion date {raw:?} could not be parsed")]
    DateParseError {
        /// Raw date text, if any.
        raw: Option<String>,
    },
    /// A synthesized date fell outside the representable calendar.
    #[error("derived date '{field}' is out of calendar range")]
    MissingDerivedDate {
        /// Output field that could not be derived.
        field: &'static str,
    },
    /// A numeric field held text that does not parse.
    #[error("field '{field}' is not numeric: {raw}")]
    MalformedNumeric {
        /// Source column.
        field: FieldName,
        /// Offending value.
        raw: String,
    },
}

/// Coarse rejection category used for tallies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectionKind {
    /// [`FilterReason::StatusNotAccepted`].
    StatusNotAccepted,
    /// [`FilterReason::ExcludedCategory`].
    ExcludedCategory,
    /// [`FilterReason::MissingCoordinates`].
    MissingCoordinates,
    /// [`FilterReason::MissingBudget`].
    MissingBudget,
    /// [`FilterReason::OutOfBounds`].
    OutOfBounds,
    /// [`RecordRejection::DateParseError`].
    DateParseError,
    /// [`RecordRejection::MissingDerivedDate`].
    MissingDerivedDate,
    /// [`RecordRejection::MalformedNumeric`].
    MalformedNumeric,
}

impl RecordRejection {
    /// Tally bucket for this rejection.
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::FilterRejected(reason) => match reason {
                FilterReason::StatusNotAccepted { .. } => RejectionKind::StatusNotAccepted,
                FilterReason::ExcludedCategory { .. } => RejectionKind::ExcludedCategory,
                FilterReason::MissingCoordinates => RejectionKind::MissingCoordinates,
                FilterReason::MissingBudget => RejectionKind::MissingBudget,
                FilterReason::OutOfBounds { .. } => RejectionKind::OutOfBounds,
            },
            Self::DateParseError { .. } => RejectionKind::DateParseError,
            Self::MissingDerivedDate { .. } => RejectionKind::MissingDerivedDate,
            Self::MalformedNumeric { .. } => RejectionKind::MalformedNumeric,
        }
    }
}

impl From<FilterReason> for RecordRejection {
    fn from(reason: FilterReason) -> Self {
        Self::FilterRejected(reason)
    }
}

impl RejectionKind {
    /// Stable snake_case label used in logs and summaries.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StatusNotAccepted => "status_not_accepted",
            Self::ExcludedCategory => "excluded_category",
            Self::MissingCoordinates => "missing_coordinates",
            Self::MissingBudget => "missing_budget",
            Self::OutOfBounds => "out_of_bounds",
            Self::DateParseError => "date_parse_error",
            Self::MissingDerivedDate => "missing_derived_date",
            Self::MalformedNumeric => "malformed_numeric",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_reasons_map_to_their_own_kind() {
        let rejection: RecordRejection = FilterReason::OutOfBounds {
            longitude: -70.0,
            latitude: 43.6,
        }
        .into();
        assert_eq!(rejection.kind(), RejectionKind::OutOfBounds);
        assert_eq!(rejection.kind().as_str(), "out_of_bounds");
        assert!(rejection.to_string().contains("outside the bounding box"));
    }

    #[test]
    fn non_filter_rejections_keep_their_kind() {
        let rejection = RecordRejection::MalformedNumeric {
            field: "Longitude",
            raw: "east".into(),
        };
        assert_eq!(rejection.kind(), RejectionKind::MalformedNumeric);
        assert_eq!(
            RecordRejection::DateParseError { raw: None }.kind(),
            RejectionKind::DateParseError
        );
    }
}
