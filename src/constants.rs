/// Column names used by the upstream capital-projects datastore.
pub mod fields {
    use crate::types::FieldName;

    /// Project display name.
    pub const PROJECT: FieldName = "Project";
    /// Free-text project description.
    pub const DESCRIPTION: FieldName = "Description";
    /// Lifecycle status (`Planning`, `Under construction`, `Complete`).
    pub const STATUS: FieldName = "Status";
    /// Project category (`Transit`, `Child care`, ...).
    pub const CATEGORY: FieldName = "Category";
    /// Longitude in decimal degrees.
    pub const LONGITUDE: FieldName = "Longitude";
    /// Latitude in decimal degrees.
    pub const LATITUDE: FieldName = "Latitude";
    /// Estimated total budget in dollars.
    pub const BUDGET: FieldName = "Estimated Total Budget ($)";
    /// Target completion date, ISO or day-month text.
    pub const TARGET_COMPLETION_DATE: FieldName = "Target Completion Date";
    /// Street address.
    pub const ADDRESS: FieldName = "Address";
    /// Postal code.
    pub const POSTAL_CODE: FieldName = "Postal Code";
    /// Project web page.
    pub const WEBSITE: FieldName = "Website";
    /// Expected community outcome.
    pub const RESULT: FieldName = "Result";
    /// Municipality or area name.
    pub const AREA: FieldName = "Area";
    /// Region name.
    pub const REGION: FieldName = "Region";
    /// `Yes`/`No` municipal funding flag.
    pub const MUNICIPAL_FUNDING: FieldName = "Municipal Funding";
    /// `Yes`/`No` provincial funding flag.
    pub const PROVINCIAL_FUNDING: FieldName = "Provincial Funding";
    /// `Yes`/`No` federal funding flag.
    pub const FEDERAL_FUNDING: FieldName = "Federal Funding";
    /// `Yes`/`No` other funding flag.
    pub const OTHER_FUNDING: FieldName = "Other Funding";
}

/// Fallback values for fields missing from a raw record.
pub mod defaults {
    /// Fallback for [`super::fields::PROJECT`].
    pub const PROJECT_NAME: &str = "Unknown Project Name";
    /// Fallback for [`super::fields::DESCRIPTION`].
    pub const DESCRIPTION: &str = "No description available.";
    /// Fallback for [`super::fields::STATUS`].
    pub const STATUS: &str = "Planning";
    /// Fallback for [`super::fields::CATEGORY`].
    pub const CATEGORY: &str = "Other";
    /// Fallback for [`super::fields::ADDRESS`].
    pub const ADDRESS: &str = "Unknown Address";
    /// Fallback for [`super::fields::POSTAL_CODE`].
    pub const POSTAL_CODE: &str = "Unknown Postal Code";
    /// Fallback for [`super::fields::RESULT`].
    pub const RESULT: &str = "No result available.";
    /// Fallback for [`super::fields::AREA`].
    pub const AREA: &str = "Unknown Area";
    /// Fallback for [`super::fields::REGION`].
    pub const REGION: &str = "Unknown Region";
    /// Website used when a record does not carry one.
    pub const WEBSITE: &str = "https://www.ontario.ca/page/building-ontario";
    /// Source value that marks a funding flag as set.
    pub const FUNDING_YES: &str = "yes";
}

/// Status and category values used by the record filter.
pub mod filter {
    /// Normalized planning status.
    pub const STATUS_PLANNING: &str = "planning";
    /// Normalized under-construction status.
    pub const STATUS_UNDER_CONSTRUCTION: &str = "under construction";
    /// Normalized status that triggers the completed-project date rules.
    pub const STATUS_COMPLETE: &str = "complete";
    /// Categories excluded from every pass.
    pub const EXCLUDED_CATEGORIES: [&str; 2] = ["child care", "health care"];
    /// Southern edge of the Greater Toronto Area box.
    pub const GTA_MIN_LAT: f64 = 43.29;
    /// Northern edge.
    pub const GTA_MAX_LAT: f64 = 44.52;
    /// Western edge.
    pub const GTA_MIN_LON: f64 = -80.16;
    /// Eastern edge.
    pub const GTA_MAX_LON: f64 = -78.32;
}

/// Pseudo-random windows used to synthesize milestone dates and budget creep.
pub mod schedule {
    /// Days subtracted from today for completed projects carrying a future date.
    pub const COMPLETED_BACKDATE_DAYS: (i64, i64) = (365, 1095);
    /// Months of slippage applied to projects that are not complete.
    pub const SLIP_MONTHS: (i64, i64) = (1, 12);
    /// Length of one slippage month in days.
    pub const DAYS_PER_MONTH: i64 = 30;
    /// Days between planning start and the original completion date.
    pub const PLANNING_LEAD_DAYS: (i64, i64) = (730, 1095);
    /// Days spent in planning.
    pub const PLANNING_DURATION_DAYS: (i64, i64) = (60, 180);
    /// Days between planning completion and construction start.
    pub const CONSTRUCTION_GAP_DAYS: (i64, i64) = (30, 120);
    /// Dollars added to the original budget to model creep.
    pub const BUDGET_CREEP: (i64, i64) = (10_000, 50_000);
    /// Number of leading characters read when parsing an ISO date.
    pub const ISO_DATE_LEN: usize = 10;
}

/// Default cost rates and efficiency thresholds.
pub mod estimator {
    /// Economic cost in dollars per delay day.
    pub const ECONOMIC_COST_PER_DAY: f64 = 1000.0;
    /// Flat opportunity cost in dollars per delay day.
    pub const OPPORTUNITY_COST_PER_DAY: f64 = 6000.0;
    /// Share of the original budget lost per delay day (0.06%).
    pub const OPPORTUNITY_COST_BUDGET_FRACTION: f64 = 0.0006;
    /// Human cost in dollars per delay day for datastore records.
    pub const HUMAN_COST_PER_DAY: f64 = 500.0;
    /// Human cost rate used by curated manual entries.
    pub const MANUAL_HUMAN_COST_PER_DAY: f64 = 2000.0;

    /// Delays above this many months are declining.
    pub const DECLINING_ABOVE_MONTHS: u32 = 8;
    /// Delays below this many months are improving.
    pub const IMPROVING_BELOW_MONTHS: u32 = 3;
    /// Declining cut point of the extended preset.
    pub const EXTENDED_DECLINING_ABOVE_MONTHS: u32 = 12;
    /// Improving cut point of the extended preset.
    pub const EXTENDED_IMPROVING_BELOW_MONTHS: u32 = 5;

    /// Score of a declining project.
    pub const DECLINING_SCORE: u32 = 60;
    /// Score of a moderate project.
    pub const MODERATE_SCORE: u32 = 75;
    /// Score of an improving project.
    pub const IMPROVING_SCORE: u32 = 90;
}

/// Constants used by batch assembly and the command-line runner.
pub mod assembly {
    /// Label of the pass collecting projects that are still in progress.
    pub const ACTIVE_PASS: &str = "active";
    /// Label of the pass collecting completed projects.
    pub const COMPLETED_PASS: &str = "completed";
    /// Maximum completed projects kept per batch.
    pub const COMPLETED_LIMIT: usize = 20;
    /// Maximum raw records read from the datastore response.
    pub const RECORD_LIMIT: usize = 5190;
    /// Default output path for the exported batch.
    pub const DEFAULT_OUTPUT_FILE: &str = "fetched_data.json";
    /// Environment variable consulted when no input path is given.
    pub const DATASTORE_PATH_ENV: &str = "CAPITAL_PROJECTS_DATASTORE_PATH";
    /// Source id reported by the datastore file source.
    pub const DATASTORE_SOURCE_ID: &str = "ontario_datastore";
}
