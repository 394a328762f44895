//! Curated projects appended to every assembled batch.
//!
//! Manual entries carry their own dates, budgets and efficiency rating; only the
//! delay and its costs are computed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::CostModelConfig;
use crate::constants::schedule::ISO_DATE_LEN;
use crate::data::{Efficiency, GeoPoint, Project};
use crate::errors::{PipelineError, RecordRejection};
use crate::estimator::{delay_days, estimate_costs};
use crate::types::{Dollars, ProjectName};

const BUNDLED_MANUAL_PROJECTS: &str = include_str!("../data/manual_projects.json");

/// Hand-maintained project entry, as stored in the manual projects file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManualProject {
    /// Display name.
    pub project_name: ProjectName,
    /// Free-text description.
    pub description: String,
    /// Decimal degrees.
    pub longitude: f64,
    /// Decimal degrees.
    pub latitude: f64,
    /// `YYYY-MM-DD`.
    pub original_completion_date: String,
    /// `YYYY-MM-DD`; the delay is measured against the original.
    pub current_completion_date: String,
    /// `YYYY-MM-DD`.
    pub planning_start_date: String,
    /// `YYYY-MM-DD`.
    pub planning_complete_date: String,
    /// `YYYY-MM-DD`.
    pub construction_start_date: String,
    /// Status label.
    pub status: String,
    /// Budget at approval.
    pub original_budget: Dollars,
    /// Latest budget.
    pub current_budget: Dollars,
    /// Category label.
    pub category: String,
    /// Expected outcome.
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
    #[serde(default)]
    pub municipal_funding: bool,
    /// Provincial funding flag.
    #[serde(default)]
    pub provincial_funding: bool,
    /// Federal funding flag.
    #[serde(default)]
    pub federal_funding: bool,
    /// Other funding flag.
    #[serde(default)]
    pub other_funding: bool,
    /// Project page.
    pub website: String,
    /// Curated efficiency label, kept as given.
    pub efficiency: Efficiency,
    /// Curated score, kept as given.
    pub performance_metric: u32,
}

impl ManualProject {
    /// Build the normalized project, computing delay and costs under `costs`.
    pub fn into_project(self, costs: &CostModelConfig) -> Result<Project, RecordRejection> {
        let original_completion_date = parse_iso(&self.original_completion_date)?;
        let current_completion_date = parse_iso(&self.current_completion_date)?;
        let delay_days = delay_days(original_completion_date, current_completion_date);
        let breakdown = estimate_costs(delay_days, self.original_budget, costs);

        Ok(Project {
            project_name: self.project_name,
            description: self.description,
            location: GeoPoint::new(self.longitude, self.latitude),
            original_completion_date,
            current_completion_date,
            planning_start_date: parse_iso(&self.planning_start_date)?,
            planning_complete_date: parse_iso(&self.planning_complete_date)?,
            construction_start_date: parse_iso(&self.construction_start_date)?,
            status: self.status,
            original_budget: self.original_budget,
            current_budget: self.current_budget,
            category: self.category,
            result: self.result,
            area: self.area,
            region: self.region,
            address: self.address,
            postal_code: self.postal_code,
            municipal_funding: self.municipal_funding,
            provincial_funding: self.provincial_funding,
            federal_funding: self.federal_funding,
            other_funding: self.other_funding,
            website: self.website,
            efficiency: self.efficiency,
            performance_metric: self.performance_metric,
            delay_days,
            economic_cost: breakdown.economic,
            opportunity_cost: breakdown.opportunity,
            human_cost: breakdown.human,
            total_cost: breakdown.total,
        })
    }
}

fn parse_iso(raw: &str) -> Result<NaiveDate, RecordRejection> {
    let trimmed = raw.trim();
    let head = trimmed.get(..ISO_DATE_LEN).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| RecordRejection::DateParseError {
        raw: Some(raw.to_string()),
    })
}

/// Parse a JSON array of manual projects.
pub fn parse_manual_projects(raw: &str) -> Result<Vec<ManualProject>, PipelineError> {
    Ok(serde_json::from_str(raw)?)
}

/// Load manual projects from a JSON array file.
pub fn load_manual_projects(path: impl AsRef<Path>) -> Result<Vec<ManualProject>, PipelineError> {
    let path = path.as_ref();
    let projects = parse_manual_projects(&fs::read_to_string(path)?)?;
    info!(
        "[capital_projects:manual] loaded {} manual projects from {}",
        projects.len(),
        path.display()
    );
    Ok(projects)
}

/// The curated Toronto projects shipped with the crate.
pub fn bundled_manual_projects() -> Result<Vec<ManualProject>, PipelineError> {
    parse_manual_projects(BUNDLED_MANUAL_PROJECTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ManualProject {
        bundled_manual_projects()
            .unwrap()
            .into_iter()
            .find(|project| project.project_name == "Eglinton Crosstown LRT Project")
            .unwrap()
    }

    #[test]
    fn bundled_list_has_ten_unique_projects() {
        let projects = bundled_manual_projects().unwrap();
        assert_eq!(projects.len(), 10);
        let mut names: Vec<&str> = projects.iter().map(|p| p.project_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn manual_entry_costs_use_given_dates() {
        let project = sample().into_project(&CostModelConfig::manual_entry()).unwrap();
        // 2022-12-31 to 2025-12-31
        assert_eq!(project.delay_days, 1096);
        assert_eq!(project.economic_cost, 1_096_000.0);
        assert_eq!(project.opportunity_cost, 6_576_000.0);
        assert_eq!(project.human_cost, 2_192_000.0);
        assert_eq!(
            project.total_cost,
            project.economic_cost + project.opportunity_cost + project.human_cost
        );
        assert_eq!(project.efficiency, Efficiency::Declining);
        assert_eq!(project.performance_metric, 60);
        assert!(project.provincial_funding && !project.municipal_funding);
    }

    #[test]
    fn early_completion_has_no_delay() {
        let mut entry = sample();
        entry.current_completion_date = "2022-01-01".to_string();
        let project = entry.into_project(&CostModelConfig::manual_entry()).unwrap();
        assert_eq!(project.delay_days, 0);
        assert_eq!(project.total_cost, 0.0);
    }

    #[test]
    fn bad_dates_are_rejected() {
        let mut entry = sample();
        entry.planning_start_date = "June 2011".to_string();
        assert_eq!(
            entry.into_project(&CostModelConfig::manual_entry()),
            Err(RecordRejection::DateParseError {
                raw: Some("June 2011".to_string())
            })
        );
    }
}
