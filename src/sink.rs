//! Destinations for normalized projects.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::data::Project;
use crate::errors::PipelineError;

/// Result of one `insert_many` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Projects accepted by this call.
    pub inserted: usize,
}

/// Receives batches of projects. Writes are not transactional.
pub trait ProjectSink {
    /// Store `projects` after any previously inserted ones.
    fn insert_many(&mut self, projects: &[Project]) -> Result<SinkReport, PipelineError>;
}

/// Pretty-printed JSON array on disk.
///
/// The file always holds every project inserted through this sink so far;
/// each call rewrites it.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    written: Vec<Project>,
}

impl JsonFileSink {
    /// Sink writing to `path`. Nothing touches disk until the first insert.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: Vec::new(),
        }
    }

    /// Output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PipelineError> {
        ensure_parent_dir(&self.path).map_err(|err| map_sink_err(&self.path, err))?;
        let body = serde_json::to_vec_pretty(&self.written)?;
        fs::write(&self.path, body).map_err(|err| map_sink_err(&self.path, err))
    }
}

impl ProjectSink for JsonFileSink {
    fn insert_many(&mut self, projects: &[Project]) -> Result<SinkReport, PipelineError> {
        if projects.is_empty() {
            warn!(
                "[capital_projects:sink] empty batch for {}",
                self.path.display()
            );
        }
        let previous = self.written.len();
        self.written.extend_from_slice(projects);
        if let Err(err) = self.flush() {
            self.written.truncate(previous);
            return Err(err);
        }
        info!(
            "[capital_projects:sink] wrote {} projects to {}",
            self.written.len(),
            self.path.display()
        );
        Ok(SinkReport {
            inserted: projects.len(),
        })
    }
}

/// Collects projects in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemorySink {
    projects: Vec<Project>,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything inserted so far.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}

impl ProjectSink for InMemorySink {
    fn insert_many(&mut self, projects: &[Project]) -> Result<SinkReport, PipelineError> {
        self.projects.extend_from_slice(projects);
        Ok(SinkReport {
            inserted: projects.len(),
        })
    }
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn map_sink_err(path: &Path, err: io::Error) -> PipelineError {
    PipelineError::Sink(format!("{}: {err}", path.display()))
}
