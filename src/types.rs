/// Project display name, also the deduplication key.
/// Example: `Ontario Line Subway`
pub type ProjectName = String;
/// Column name in an upstream datastore record.
/// Examples: `Status`, `Estimated Total Budget ($)`, `Target Completion Date`
pub type FieldName = &'static str;
/// Normalized (trimmed, lowercased) status or category value used for matching.
/// Examples: `under construction`, `child care`
pub type NormalizedValue = String;
/// Identifier for the collaborator that produced raw records.
/// Examples: `ontario_datastore`, `in_memory`
pub type SourceId = String;
/// Label for one collection pass in an assembly plan.
/// Examples: `active`, `completed`
pub type PassLabel = String;
/// Monetary amount in dollars.
/// Example: `1000000.0`
pub type Dollars = f64;
