#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner used by the `capital_projects` binary.
pub mod app;
/// Batch assembly across status passes.
pub mod assembly;
/// Injectable "today".
pub mod clock;
/// Pipeline configuration types.
pub mod config;
/// Centralized constants: field names, defaults, windows, and rates.
pub mod constants;
/// Raw record and normalized project types.
pub mod data;
/// Completion date parsing and schedule synthesis.
pub mod dates;
/// Project-name deduplication.
pub mod dedup;
/// Delay, efficiency, and cost estimation.
pub mod estimator;
/// Record admission rules.
pub mod filter;
mod hash;
/// Curated manual projects.
pub mod manual;
/// Rejection tallies and summaries.
pub mod metrics;
/// Record → project transformation.
pub mod pipeline;
/// Injectable uniform integer source.
pub mod random;
/// Project sinks.
pub mod sink;
/// Raw record sources.
pub mod source;
/// Shared type aliases.
pub mod types;
/// Text normalization and formatting helpers.
pub mod utils;

mod errors;

pub use assembly::{AssembledBatch, AssemblyPlan, PassReport, PassSpec};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    BoundingBox, CostModelConfig, EfficiencyThresholds, OpportunityCostPolicy, PipelineConfig,
    ScheduleConfig,
};
pub use data::{CostBreakdown, Efficiency, GeoPoint, Project, RawRecord};
pub use errors::{FilterReason, PipelineError, RecordRejection, RejectionKind};
pub use manual::ManualProject;
pub use metrics::{RejectionSummary, RejectionTally};
pub use pipeline::{PassOutcome, ProjectPipeline};
pub use random::{RandomSource, RngSource, ScriptedRandom};
pub use sink::{InMemorySink, JsonFileSink, ProjectSink, SinkReport};
pub use source::{DatastoreFileSource, InMemorySource, RecordSource};
pub use types::{Dollars, FieldName, NormalizedValue, PassLabel, ProjectName, SourceId};
