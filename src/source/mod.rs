//! Raw-record sources.
//!
//! Network fetching lives outside this crate; sources here read records that a
//! collaborator already downloaded, or hold them in memory.

use std::sync::Arc;

use crate::data::RawRecord;
use crate::errors::PipelineError;
use crate::types::SourceId;

/// File-backed datastore responses.
pub mod datastore;

pub use datastore::DatastoreFileSource;

/// Pipeline-facing record provider.
///
/// Any pagination or server-side limit is already applied by the
/// implementation; `limit` truncates the returned sequence.
pub trait RecordSource: Send + Sync {
    /// Stable source identifier used in logs and errors.
    fn id(&self) -> &str;
    /// Return up to `limit` records in upstream order.
    fn fetch(&self, limit: Option<usize>) -> Result<Vec<RawRecord>, PipelineError>;
}

/// In-memory record source for tests and small datasets.
pub struct InMemorySource {
    id: SourceId,
    records: Arc<Vec<RawRecord>>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<RawRecord>) -> Self {
        Self {
            id: id.into(),
            records: Arc::new(records),
        }
    }
}

impl RecordSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, limit: Option<usize>) -> Result<Vec<RawRecord>, PipelineError> {
        let max = limit.unwrap_or(self.records.len());
        Ok(self.records.iter().take(max).cloned().collect())
    }
}
