use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::RecordSource;
use crate::constants::assembly::DATASTORE_SOURCE_ID;
use crate::data::RawRecord;
use crate::errors::PipelineError;
use crate::types::SourceId;

/// Reads a saved `datastore_search` response from disk.
///
/// Accepted layouts:
/// - `{"result": {"records": [...]}}` (the API envelope)
/// - `{"records": [...]}`
/// - a bare `[...]` array
///
/// Non-object array entries are skipped with a warning.
#[derive(Clone, Debug)]
pub struct DatastoreFileSource {
    id: SourceId,
    path: PathBuf,
}

impl DatastoreFileSource {
    /// Source reading `path` under the default datastore id.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            id: DATASTORE_SOURCE_ID.to_string(),
            path: path.into(),
        }
    }

    /// Override the source id.
    pub fn with_id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = id.into();
        self
    }

    /// Response file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: String) -> PipelineError {
        PipelineError::SourceUnavailable {
            source_id: self.id.clone(),
            reason,
        }
    }

    fn records_array(&self, body: Value) -> Result<Vec<Value>, PipelineError> {
        let records = match body {
            Value::Array(items) => Some(items),
            Value::Object(mut root) => match root.remove("result") {
                Some(Value::Object(mut result)) => result.remove("records"),
                _ => root.remove("records"),
            }
            .and_then(|records| match records {
                Value::Array(items) => Some(items),
                _ => None,
            }),
            _ => None,
        };
        records.ok_or_else(|| {
            self.unavailable(format!(
                "{} does not contain a records array",
                self.path.display()
            ))
        })
    }
}

impl RecordSource for DatastoreFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self, limit: Option<usize>) -> Result<Vec<RawRecord>, PipelineError> {
        let raw = fs::read_to_string(&self.path).map_err(|err| {
            self.unavailable(format!("failed reading {}: {err}", self.path.display()))
        })?;
        let body: Value = serde_json::from_str(&raw).map_err(|err| {
            self.unavailable(format!("invalid JSON in {}: {err}", self.path.display()))
        })?;
        let items = self.records_array(body)?;
        let available = items.len();
        let max = limit.unwrap_or(available);

        let mut records = Vec::with_capacity(max.min(available));
        for (idx, item) in items.into_iter().take(max).enumerate() {
            match RawRecord::from_value(item) {
                Some(record) => records.push(record),
                None => warn!(
                    "[capital_projects:source] skipping non-object record {} in {}",
                    idx,
                    self.path.display()
                ),
            }
        }
        info!(
            "[capital_projects:source] loaded {} of {} records from '{}'",
            records.len(),
            available,
            self.id
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fields;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn reads_api_envelope_with_limit() {
        let dir = tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "response.json",
            &json!({
                "success": true,
                "result": {"records": [
                    {"Project": "A"}, {"Project": "B"}, {"Project": "C"}
                ]}
            }),
        );
        let source = DatastoreFileSource::new(&path);
        assert_eq!(source.id(), DATASTORE_SOURCE_ID);
        let records = source.fetch(Some(2)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text(fields::PROJECT).as_deref(), Some("A"));
    }

    #[test]
    fn reads_bare_arrays_and_skips_non_objects() {
        let dir = tempdir().unwrap();
        let path = write_json(
            dir.path(),
            "records.json",
            &json!([{"Project": "A"}, 42, {"Project": "B"}]),
        );
        let records = DatastoreFileSource::new(&path)
            .with_id("local")
            .fetch(None)
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_file_and_wrong_shape_are_unavailable() {
        let dir = tempdir().unwrap();
        let missing = DatastoreFileSource::new(dir.path().join("absent.json"));
        assert!(matches!(
            missing.fetch(None),
            Err(PipelineError::SourceUnavailable { .. })
        ));

        let path = write_json(dir.path(), "shape.json", &json!({"result": {"total": 3}}));
        let err = DatastoreFileSource::new(&path).fetch(None).unwrap_err();
        assert!(err.to_string().contains("records array"));
    }
}
