use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::assembly::{AssembledBatch, AssemblyPlan};
use crate::config::{CostModelConfig, EfficiencyThresholds, PipelineConfig};
use crate::constants::assembly::{
    COMPLETED_LIMIT, COMPLETED_PASS, DATASTORE_PATH_ENV, DEFAULT_OUTPUT_FILE, RECORD_LIMIT,
};
use crate::manual::{ManualProject, bundled_manual_projects, load_manual_projects};
use crate::metrics::{RejectionTally, rejection_summary};
use crate::pipeline::ProjectPipeline;
use crate::random::RngSource;
use crate::sink::{JsonFileSink, ProjectSink};
use crate::source::{DatastoreFileSource, RecordSource};
use crate::utils::format_with_commas;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CostModelArg {
    FlatRate,
    BudgetFraction,
    ManualEntry,
}

impl From<CostModelArg> for CostModelConfig {
    fn from(value: CostModelArg) -> Self {
        match value {
            CostModelArg::FlatRate => CostModelConfig::flat_rate(),
            CostModelArg::BudgetFraction => CostModelConfig::budget_fraction(),
            CostModelArg::ManualEntry => CostModelConfig::manual_entry(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThresholdsArg {
    Standard,
    Extended,
}

impl From<ThresholdsArg> for EfficiencyThresholds {
    fn from(value: ThresholdsArg) -> Self {
        match value {
            ThresholdsArg::Standard => EfficiencyThresholds::standard(),
            ThresholdsArg::Extended => EfficiencyThresholds::extended(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "capital_projects",
    disable_help_subcommand = true,
    about = "Normalize Ontario capital-projects records",
    long_about = "Filter, date, cost, and deduplicate capital-projects records from a saved datastore response, then write them as a JSON array.",
    after_help = "The input path is resolved from --input, then the CAPITAL_PROJECTS_DATASTORE_PATH environment variable."
)]
/// CLI for `capital_projects`.
///
/// Common usage:
/// - Reproducible run: `--input response.json --seed 7`
/// - Replace the curated list: `--manual my_projects.json`
/// - Budget-scaled opportunity cost: `--cost-model budget-fraction`
struct PipelineCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "Saved datastore response (envelope or bare array)"
    )]
    input: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON array of manual projects (defaults to the bundled list)"
    )]
    manual: Option<PathBuf>,
    #[arg(
        long = "skip-manual",
        conflicts_with = "manual",
        help = "Do not append manual projects"
    )]
    skip_manual: bool,
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_OUTPUT_FILE,
        help = "Output JSON file"
    )]
    output: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "Optional JSON pipeline config; omitted keys keep defaults"
    )]
    config: Option<PathBuf>,
    #[arg(long, help = "Optional deterministic seed for synthesized dates and budgets")]
    seed: Option<u64>,
    #[arg(
        long = "record-limit",
        default_value_t = RECORD_LIMIT,
        value_parser = parse_positive_usize,
        help = "Maximum records read from the input"
    )]
    record_limit: usize,
    #[arg(
        long = "completed-limit",
        default_value_t = COMPLETED_LIMIT,
        help = "Maximum completed projects kept"
    )]
    completed_limit: usize,
    #[arg(long = "cost-model", value_enum, help = "Cost model preset override")]
    cost_model: Option<CostModelArg>,
    #[arg(long, value_enum, help = "Efficiency threshold preset override")]
    thresholds: Option<ThresholdsArg>,
}

/// Run the full fetch-file → assemble → export flow.
pub fn run_pipeline_cli<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<PipelineCli, _>(
        std::iter::once("capital_projects".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let input = resolve_input(cli.input)?;

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(cost_model) = cli.cost_model {
        config.costs = cost_model.into();
    }
    if let Some(thresholds) = cli.thresholds {
        config.thresholds = thresholds.into();
    }

    let source = DatastoreFileSource::new(&input);
    let records = source.fetch(Some(cli.record_limit))?;

    let manual: Vec<ManualProject> = if cli.skip_manual {
        Vec::new()
    } else {
        match &cli.manual {
            Some(path) => load_manual_projects(path)?,
            None => bundled_manual_projects()?,
        }
    };

    let mut plan = AssemblyPlan::for_config(&config);
    plan.set_limit(COMPLETED_PASS, Some(cli.completed_limit));

    let mut random = match cli.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_os(),
    };
    let pipeline = ProjectPipeline::with_system_clock(config)?;
    let batch = plan.assemble(
        &pipeline,
        &records,
        manual,
        &CostModelConfig::manual_entry(),
        &mut random,
    )?;

    let mut sink = JsonFileSink::new(&cli.output);
    let report = sink.insert_many(&batch.projects)?;

    print_summary(source.id(), records.len(), &batch);
    println!(
        "wrote {} projects to {}",
        report.inserted,
        cli.output.display()
    );
    Ok(())
}

fn resolve_input(explicit: Option<PathBuf>) -> Result<PathBuf, Box<dyn Error>> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    match std::env::var(DATASTORE_PATH_ENV) {
        Ok(value) if !value.trim().is_empty() => Ok(PathBuf::from(value.trim())),
        _ => Err(format!("no input given; pass --input or set {DATASTORE_PATH_ENV}").into()),
    }
}

fn print_summary(source_id: &str, fetched: usize, batch: &AssembledBatch) {
    println!("=== capital projects batch ===");
    println!("source: {} ({} records)", source_id, fetched);
    println!();

    println!("[PASSES]");
    for pass in &batch.passes {
        println!(
            "  {} => produced {}, kept {}",
            pass.label, pass.produced, pass.kept
        );
        print_rejections(pass.produced, &pass.rejections);
    }
    println!("[MANUAL]");
    println!("  added {}", batch.manual_added);
    if !batch.manual_rejections.is_empty() {
        print_rejections(batch.manual_added, &batch.manual_rejections);
    }
    println!();

    let total_cost: f64 = batch.projects.iter().map(|project| project.total_cost).sum();
    println!("duplicates removed: {}", batch.duplicates_removed);
    println!("projects: {}", batch.projects.len());
    println!(
        "estimated delay cost: ${}",
        format_with_commas(total_cost.round() as u64)
    );
}

fn print_rejections(accepted: usize, tally: &RejectionTally) {
    let summary = rejection_summary(accepted, tally);
    println!(
        "    inspected {}, acceptance {:.1}%",
        summary.inspected,
        summary.acceptance_rate * 100.0
    );
    for share in &summary.per_kind {
        println!(
            "    {:<22} {:>6} ({:.1}%)",
            share.kind.as_str(),
            share.count,
            share.share * 100.0
        );
    }
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
