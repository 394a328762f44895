//! Record → project transformation.
//!
//! Ownership model:
//! - `ProjectPipeline` owns configuration and the clock; it keeps no state
//!   between records.
//! - Callers own the `RandomSource`, so a run is reproducible whenever the
//!   caller seeds it.
//! - Deduplication runs once per batch, after every record was transformed.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::PipelineConfig;
use crate::data::{Project, RawRecord};
use crate::dates::derive_dates;
use crate::dedup::dedup_by_name;
use crate::errors::{PipelineError, RecordRejection};
use crate::estimator::{current_budget, estimate};
use crate::filter::filter_record;
use crate::hash::record_seed;
use crate::metrics::RejectionTally;
use crate::random::{RandomSource, RngSource};

/// Projects produced by one run over a record set, plus what was dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassOutcome {
    /// Projects in input order.
    pub projects: Vec<Project>,
    /// Dropped records by kind.
    pub rejections: RejectionTally,
}

impl PassOutcome {
    /// Drop repeated project names, keeping the first.
    pub fn deduplicated(self) -> Self {
        Self {
            projects: dedup_by_name(self.projects),
            rejections: self.rejections,
        }
    }

    fn collect(results: impl IntoIterator<Item = Result<Project, RecordRejection>>) -> Self {
        let mut outcome = Self::default();
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok(project) => outcome.projects.push(project),
                Err(rejection) => {
                    debug!(
                        "[capital_projects:pipeline] record {} dropped ({}): {}",
                        idx,
                        rejection.kind().as_str(),
                        rejection
                    );
                    outcome.rejections.record(&rejection);
                }
            }
        }
        outcome
    }
}

/// Filter → date deriver → estimator, configured once and applied per record.
#[derive(Clone, Debug)]
pub struct ProjectPipeline<C = SystemClock> {
    config: PipelineConfig,
    clock: C,
}

impl ProjectPipeline<SystemClock> {
    /// Pipeline reading "today" from the local clock.
    pub fn with_system_clock(config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> ProjectPipeline<C> {
    /// Validate `config` and build a pipeline around it.
    ///
    /// Windows and rates are checked once here, so per-record draws never see an
    /// inverted range.
    pub fn new(config: PipelineConfig, clock: C) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Same clock, different (validated) configuration.
    pub fn reconfigured(&self, config: PipelineConfig) -> Result<Self, PipelineError>
    where
        C: Clone,
    {
        Self::new(config, self.clock.clone())
    }

    /// Transform one record, or report why it was excluded.
    pub fn transform_record<R: RandomSource + ?Sized>(
        &self,
        record: &RawRecord,
        random: &mut R,
    ) -> Result<Project, RecordRejection> {
        let accepted = filter_record(record, &self.config)?;
        let dates = derive_dates(
            accepted.target_completion.as_deref(),
            &accepted.normalized_status,
            self.clock.today(),
            &self.config.schedule,
            random,
        )?;
        let estimate = estimate(
            dates.original_completion,
            dates.current_completion,
            accepted.original_budget,
            &self.config.thresholds,
            &self.config.costs,
        );
        let current_budget =
            current_budget(accepted.original_budget, &self.config.schedule, random);

        Ok(Project {
            project_name: accepted.project_name,
            description: accepted.description,
            location: accepted.location,
            original_completion_date: dates.original_completion,
            current_completion_date: dates.current_completion,
            planning_start_date: dates.planning_start,
            planning_complete_date: dates.planning_complete,
            construction_start_date: dates.construction_start,
            status: accepted.status,
            original_budget: accepted.original_budget,
            current_budget,
            category: accepted.category,
            result: accepted.result,
            area: accepted.area,
            region: accepted.region,
            address: accepted.address,
            postal_code: accepted.postal_code,
            municipal_funding: accepted.funding.municipal,
            provincial_funding: accepted.funding.provincial,
            federal_funding: accepted.funding.federal,
            other_funding: accepted.funding.other,
            website: accepted.website,
            efficiency: estimate.efficiency,
            performance_metric: estimate.performance_metric,
            delay_days: estimate.delay_days,
            economic_cost: estimate.costs.economic,
            opportunity_cost: estimate.costs.opportunity,
            human_cost: estimate.costs.human,
            total_cost: estimate.costs.total,
        })
    }

    /// Transform every record in order, sharing one random source.
    ///
    /// Rejected records are dropped and tallied; the batch never aborts.
    pub fn transform_batch<R: RandomSource + ?Sized>(
        &self,
        records: &[RawRecord],
        random: &mut R,
    ) -> PassOutcome {
        let outcome = PassOutcome::collect(
            records
                .iter()
                .map(|record| self.transform_record(record, &mut *random)),
        );
        self.log_outcome(records.len(), &outcome);
        outcome
    }

    /// Transform then deduplicate.
    pub fn run_batch<R: RandomSource + ?Sized>(
        &self,
        records: &[RawRecord],
        random: &mut R,
    ) -> PassOutcome {
        self.transform_batch(records, random).deduplicated()
    }

    /// Parallel transform with one generator per record, seeded from `seed` and
    /// the record's position. Output order matches input order and does not depend
    /// on the thread count.
    pub fn par_transform_seeded(&self, records: &[RawRecord], seed: u64) -> PassOutcome {
        let results: Vec<Result<Project, RecordRejection>> = records
            .par_iter()
            .enumerate()
            .map(|(idx, record)| {
                let mut random = RngSource::seeded(record_seed(seed, idx));
                self.transform_record(record, &mut random)
            })
            .collect();
        let outcome = PassOutcome::collect(results);
        self.log_outcome(records.len(), &outcome);
        outcome
    }

    fn log_outcome(&self, inspected: usize, outcome: &PassOutcome) {
        info!(
            "[capital_projects:pipeline] transformed {} of {} records (statuses={:?}, rejected={})",
            outcome.projects.len(),
            inspected,
            self.config.accepted_statuses,
            outcome.rejections.total()
        );
    }
}
