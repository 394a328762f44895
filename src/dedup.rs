use std::collections::HashSet;

use crate::data::Project;

/// Keep the first project for each exact `project_name`, preserving order.
pub fn dedup_by_name(projects: Vec<Project>) -> Vec<Project> {
    let mut seen = HashSet::with_capacity(projects.len());
    projects
        .into_iter()
        .filter(|project| seen.insert(project.project_name.clone()))
        .collect()
}
