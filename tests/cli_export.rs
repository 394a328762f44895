use std::fs;
use std::path::Path;

use chrono::Local;
use serde_json::{Value, json};
use tempfile::tempdir;

use capital_projects::Project;
use capital_projects::app::run_pipeline_cli;

fn write_response(path: &Path) {
    let record = |name: &str, status: &str, category: &str, date: &str| {
        json!({
            "Project": name,
            "Status": status,
            "Category": category,
            "Longitude": "-79.40",
            "Latitude": 43.70,
            "Estimated Total Budget ($)": "$2,500,000",
            "Target Completion Date": date,
            "Provincial Funding": "Yes"
        })
    };
    let body = json!({
        "success": true,
        "result": {"records": [
            record("Hospital Wing", "Under construction", "Health Care", "2024-01-01"),
            record("Bus Depot", "Under construction", "Transit", "2023-05-01"),
            record("Library", "Planning", "Communities", "15-Sep"),
            record("Old Bridge", "Complete", "Roads and bridges", "2021-04-01"),
            record("Future Park", "Complete", "Communities", "2999-01-01"),
            record("Bus Depot", "Planning", "Transit", "2026-01-01"),
            "not a record"
        ]}
    });
    fs::write(path, serde_json::to_vec(&body).unwrap()).unwrap();
}

fn run(args: &[&str]) {
    run_pipeline_cli(args.iter().map(|arg| arg.to_string())).unwrap();
}

fn read_projects(path: &Path) -> Vec<Project> {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn cli_exports_active_and_completed_projects() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("response.json");
    let output = dir.path().join("fetched_data.json");
    write_response(&input);

    run(&[
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--seed",
        "7",
        "--skip-manual",
    ]);

    let projects = read_projects(&output);
    let names: Vec<&str> = projects.iter().map(|p| p.project_name.as_str()).collect();
    assert_eq!(names, vec!["Bus Depot", "Library", "Old Bridge", "Future Park"]);
    assert!(projects.iter().all(|p| p.provincial_funding));
    assert!(projects.iter().all(|p| p.original_budget == 2_500_000.0));

    let future_park = &projects[3];
    assert_eq!(future_park.delay_days, 0);
    assert!(future_park.original_completion_date < Local::now().date_naive());

    let raw: Value = serde_json::from_slice(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(raw[0]["location"]["coordinates"][0], -79.4);
}

#[test]
fn cli_limits_completed_projects_and_appends_manual_list() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("response.json");
    let output = dir.path().join("out").join("batch.json");
    write_response(&input);

    run(&[
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--completed-limit",
        "1",
        "--record-limit",
        "4",
        "--cost-model",
        "budget-fraction",
    ]);

    let projects = read_projects(&output);
    let names: Vec<&str> = projects.iter().map(|p| p.project_name.as_str()).collect();
    assert_eq!(&names[..3], &["Bus Depot", "Library", "Old Bridge"]);
    assert_eq!(projects.len(), 3 + 10);
    assert!(names.contains(&"Ontario Line Subway"));

    let bus_depot = &projects[0];
    let expected_opportunity = bus_depot.delay_days as f64 * 0.0006 * 2_500_000.0;
    assert!((bus_depot.opportunity_cost - expected_opportunity).abs() < 1e-6);
}

#[test]
fn cli_reports_missing_input_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let err = run_pipeline_cli(
        ["--input", missing.to_str().unwrap()]
            .iter()
            .map(|arg| arg.to_string()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("unavailable"));
}

#[test]
fn cli_help_exits_cleanly() {
    run(&["--help"]);
}

fn write_two_status_response(path: &Path) {
    let record = |name: &str, status: &str| {
        json!({
            "Project": name,
            "Status": status,
            "Category": "Transit",
            "Longitude": -79.38,
            "Latitude": 43.65,
            "Estimated Total Budget ($)": 1_000_000,
            "Target Completion Date": "2024-06-15"
        })
    };
    let body = json!([
        record("Building", "Under construction"),
        record("Drafting", "Planning")
    ]);
    fs::write(path, serde_json::to_vec(&body).unwrap()).unwrap();
}

#[test]
fn cli_honors_accepted_statuses_from_config_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("records.json");
    let config = dir.path().join("config.json");
    let output = dir.path().join("fetched_data.json");
    write_two_status_response(&input);
    fs::write(&config, r#"{"accepted_statuses": ["under construction"]}"#).unwrap();

    run(&[
        "--input",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--seed",
        "3",
        "--skip-manual",
    ]);

    let projects = read_projects(&output);
    let names: Vec<&str> = projects.iter().map(|p| p.project_name.as_str()).collect();
    assert_eq!(names, vec!["Building"]);
}

#[test]
fn cli_rejects_invalid_config_before_transforming() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("records.json");
    let config = dir.path().join("config.json");
    let output = dir.path().join("fetched_data.json");
    write_two_status_response(&input);
    fs::write(
        &config,
        r#"{"schedule": {"planning_lead_days": [900, 100]}}"#,
    )
    .unwrap();

    let err = run_pipeline_cli(
        [
            "--input",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ]
        .iter()
        .map(|arg| arg.to_string()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("planning_lead_days"));
    assert!(!output.exists());
}
