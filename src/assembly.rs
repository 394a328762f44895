//! Multi-pass batch assembly.
//!
//! A batch is built from several passes over the same fetched records, each with
//! its own accepted statuses and an optional cap on the projects it contributes.
//! Manual projects follow the passes, and the concatenation is deduplicated by
//! project name.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::config::{CostModelConfig, PipelineConfig};
use crate::constants::assembly::{ACTIVE_PASS, COMPLETED_LIMIT, COMPLETED_PASS};
use crate::constants::filter::{STATUS_COMPLETE, STATUS_PLANNING, STATUS_UNDER_CONSTRUCTION};
use crate::data::{Project, RawRecord};
use crate::dedup::dedup_by_name;
use crate::errors::PipelineError;
use crate::manual::ManualProject;
use crate::metrics::RejectionTally;
use crate::pipeline::ProjectPipeline;
use crate::random::RandomSource;
use crate::types::{NormalizedValue, PassLabel};

/// One collection pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSpec {
    /// Name used in logs and reports.
    pub label: PassLabel,
    /// Statuses this pass admits, replacing the pipeline's own.
    pub accepted_statuses: Vec<NormalizedValue>,
    /// Maximum projects this pass contributes, counted before deduplication.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PassSpec {
    /// Unlimited pass over `statuses`.
    pub fn new<I, S>(label: impl Into<PassLabel>, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NormalizedValue>,
    {
        Self {
            label: label.into(),
            accepted_statuses: statuses.into_iter().map(Into::into).collect(),
            limit: None,
        }
    }

    /// Cap the projects this pass contributes.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Ordered passes making up one batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyPlan {
    /// Passes in output order.
    pub passes: Vec<PassSpec>,
}

impl Default for AssemblyPlan {
    /// Active projects, then at most 20 completed ones.
    fn default() -> Self {
        Self {
            passes: vec![
                PassSpec::new(ACTIVE_PASS, [STATUS_UNDER_CONSTRUCTION, STATUS_PLANNING]),
                PassSpec::new(COMPLETED_PASS, [STATUS_COMPLETE]).with_limit(COMPLETED_LIMIT),
            ],
        }
    }
}

/// Per-pass accounting.
#[derive(Clone, Debug, PartialEq)]
pub struct PassReport {
    /// Label of the pass.
    pub label: PassLabel,
    /// Projects the pipeline produced before the pass limit.
    pub produced: usize,
    /// Projects handed to deduplication.
    pub kept: usize,
    /// Records this pass dropped, by kind.
    pub rejections: RejectionTally,
}

/// Deduplicated batch plus how it was built.
#[derive(Clone, Debug, PartialEq)]
pub struct AssembledBatch {
    /// Deduplicated projects: passes in plan order, then manual entries.
    pub projects: Vec<Project>,
    /// One report per pass, in plan order.
    pub passes: Vec<PassReport>,
    /// Manual entries converted successfully.
    pub manual_added: usize,
    /// Manual entries skipped, by kind.
    pub manual_rejections: RejectionTally,
    /// Projects dropped by name deduplication.
    pub duplicates_removed: usize,
}

impl AssemblyPlan {
    /// Default passes, with the active pass admitting `config.accepted_statuses`.
    pub fn for_config(config: &PipelineConfig) -> Self {
        let mut plan = Self::default();
        if let Some(active) = plan.passes.iter_mut().find(|pass| pass.label == ACTIVE_PASS) {
            active.accepted_statuses = config.accepted_statuses.clone();
        }
        plan
    }

    /// Replace the limit of the pass named `label`. Returns false if no pass matches.
    pub fn set_limit(&mut self, label: &str, limit: Option<usize>) -> bool {
        match self.passes.iter_mut().find(|pass| pass.label == label) {
            Some(pass) => {
                pass.limit = limit;
                true
            }
            None => false,
        }
    }

    /// Run every pass, append manual projects, and deduplicate.
    ///
    /// Each pass reuses `pipeline`'s configuration with its own accepted statuses.
    /// One random source is shared across passes in plan order. Fails only when a
    /// pass's statuses make the configuration invalid.
    pub fn assemble<C, R>(
        &self,
        pipeline: &ProjectPipeline<C>,
        records: &[RawRecord],
        manual: Vec<ManualProject>,
        manual_costs: &CostModelConfig,
        random: &mut R,
    ) -> Result<AssembledBatch, PipelineError>
    where
        C: Clock + Clone,
        R: RandomSource + ?Sized,
    {
        let mut combined = Vec::new();
        let mut passes = Vec::with_capacity(self.passes.len());

        for spec in &self.passes {
            let pass_pipeline = pipeline.reconfigured(
                pipeline
                    .config()
                    .clone()
                    .with_accepted_statuses(&spec.accepted_statuses),
            )?;
            let mut outcome = pass_pipeline.transform_batch(records, &mut *random);
            let produced = outcome.projects.len();
            if let Some(limit) = spec.limit {
                outcome.projects.truncate(limit);
            }
            info!(
                "[capital_projects:assembly] pass '{}' kept {} of {} projects",
                spec.label,
                outcome.projects.len(),
                produced
            );
            passes.push(PassReport {
                label: spec.label.clone(),
                produced,
                kept: outcome.projects.len(),
                rejections: outcome.rejections,
            });
            combined.extend(outcome.projects);
        }

        let mut manual_added = 0;
        let mut manual_rejections = RejectionTally::new();
        for entry in manual {
            let name = entry.project_name.clone();
            match entry.into_project(manual_costs) {
                Ok(project) => {
                    combined.push(project);
                    manual_added += 1;
                }
                Err(rejection) => {
                    warn!(
                        "[capital_projects:assembly] manual project '{}' skipped: {}",
                        name, rejection
                    );
                    manual_rejections.record(&rejection);
                }
            }
        }

        let before = combined.len();
        let projects = dedup_by_name(combined);
        let duplicates_removed = before - projects.len();
        info!(
            "[capital_projects:assembly] assembled {} projects ({} manual, {} duplicates removed)",
            projects.len(),
            manual_added,
            duplicates_removed
        );

        Ok(AssembledBatch {
            projects,
            passes,
            manual_added,
            manual_rejections,
            duplicates_removed,
        })
    }
}

impl AssembledBatch {
    /// Every rejection across passes and manual entries.
    pub fn total_rejections(&self) -> RejectionTally {
        let mut tally = RejectionTally::new();
        for pass in &self.passes {
            tally.merge(&pass.rejections);
        }
        tally.merge(&self.manual_rejections);
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::constants::fields;
    use crate::errors::RejectionKind;
    use crate::manual::bundled_manual_projects;
    use crate::random::RngSource;
    use chrono::NaiveDate;

    fn pipeline() -> ProjectPipeline<FixedClock> {
        ProjectPipeline::new(
            PipelineConfig::default(),
            FixedClock(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        )
        .unwrap()
    }

    fn record(name: &str, status: &str) -> RawRecord {
        RawRecord::new()
            .with(fields::PROJECT, name)
            .with(fields::STATUS, status)
            .with(fields::CATEGORY, "Transit")
            .with(fields::LONGITUDE, -79.4)
            .with(fields::LATITUDE, 43.7)
            .with(fields::BUDGET, 500_000)
            .with(fields::TARGET_COMPLETION_DATE, "2023-03-01")
    }

    #[test]
    fn default_plan_has_active_then_limited_completed() {
        let plan = AssemblyPlan::default();
        assert_eq!(plan.passes.len(), 2);
        assert_eq!(plan.passes[0].label, ACTIVE_PASS);
        assert_eq!(plan.passes[0].limit, None);
        assert_eq!(plan.passes[1].limit, Some(COMPLETED_LIMIT));
    }

    #[test]
    fn completed_pass_is_capped_and_ordered_after_active() {
        let mut records = vec![record("Active", "Planning")];
        records.extend((0..5).map(|idx| record(&format!("Done {idx}"), "Complete")));
        let mut plan = AssemblyPlan::default();
        assert!(plan.set_limit(COMPLETED_PASS, Some(3)));
        assert!(!plan.set_limit("missing", None));

        let batch = plan.assemble(
            &pipeline(),
            &records,
            Vec::new(),
            &CostModelConfig::manual_entry(),
            &mut RngSource::seeded(1),
        )
        .unwrap();
        let names: Vec<&str> = batch.projects.iter().map(|p| p.project_name.as_str()).collect();
        assert_eq!(names, vec!["Active", "Done 0", "Done 1", "Done 2"]);
        assert_eq!(batch.passes[1].produced, 5);
        assert_eq!(batch.passes[1].kept, 3);
        assert_eq!(
            batch.passes[0].rejections.count(RejectionKind::StatusNotAccepted),
            5
        );
    }

    #[test]
    fn manual_projects_follow_passes_and_lose_to_earlier_duplicates() {
        let manual = bundled_manual_projects().unwrap();
        let records = vec![record("Ontario Line Subway", "Under construction")];
        let batch = AssemblyPlan::default().assemble(
            &pipeline(),
            &records,
            manual,
            &CostModelConfig::manual_entry(),
            &mut RngSource::seeded(2),
        )
        .unwrap();
        assert_eq!(batch.manual_added, 10);
        assert_eq!(batch.duplicates_removed, 1);
        assert_eq!(batch.projects.len(), 10);
        assert_eq!(batch.projects[0].project_name, "Ontario Line Subway");
        assert_eq!(batch.projects[0].original_budget, 500_000.0);
        assert_eq!(
            batch.projects[1].project_name,
            "Eglinton Crosstown LRT Project"
        );
    }

    #[test]
    fn invalid_manual_entries_are_tallied() {
        let mut manual = bundled_manual_projects().unwrap();
        manual.truncate(2);
        manual[1].original_completion_date = "unknown".to_string();
        let batch = AssemblyPlan::default().assemble(
            &pipeline(),
            &[],
            manual,
            &CostModelConfig::manual_entry(),
            &mut RngSource::seeded(3),
        )
        .unwrap();
        assert_eq!(batch.manual_added, 1);
        assert_eq!(
            batch.total_rejections().count(RejectionKind::DateParseError),
            1
        );
    }

    #[test]
    fn active_pass_follows_configured_statuses() {
        let config = PipelineConfig::default().with_accepted_statuses(["under construction"]);
        let plan = AssemblyPlan::for_config(&config);
        assert_eq!(plan.passes[0].accepted_statuses, vec!["under construction"]);
        assert_eq!(plan.passes[1].accepted_statuses, vec![STATUS_COMPLETE]);

        let records = vec![
            record("Building", "Under construction"),
            record("Drafting", "Planning"),
        ];
        let batch = plan
            .assemble(
                &pipeline(),
                &records,
                Vec::new(),
                &CostModelConfig::manual_entry(),
                &mut RngSource::seeded(4),
            )
            .unwrap();
        let names: Vec<&str> = batch.projects.iter().map(|p| p.project_name.as_str()).collect();
        assert_eq!(names, vec!["Building"]);
    }

    #[test]
    fn pass_without_statuses_is_a_configuration_error() {
        let plan = AssemblyPlan {
            passes: vec![PassSpec::new("empty", Vec::<String>::new())],
        };
        let result = plan.assemble(
            &pipeline(),
            &[],
            Vec::new(),
            &CostModelConfig::manual_entry(),
            &mut RngSource::seeded(5),
        );
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }
}
