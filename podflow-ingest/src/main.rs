//! podflow-ingest - one pass over the podcast drop folder
//!
//! Matches newly dropped episode media against the roster, files media and
//! transcript under `Ep<n>_<guest>`, and writes generated show notes next to
//! them. Exits non-zero on configuration errors or when any item failed.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use podflow_common::{ConfigOrigin, PodflowConfig};
use podflow_ingest::backends::LocalStorage;
use podflow_ingest::models::{PlannedAction, RunSummary};
use podflow_ingest::services::plan_pass;
use podflow_ingest::{config, EpisodeDirectory, PipelineOrchestrator};

/// Command-line arguments for podflow-ingest
#[derive(Parser, Debug)]
#[command(name = "podflow-ingest")]
#[command(about = "Organize dropped podcast episodes and generate show notes")]
#[command(version, long_version = podflow_ingest::LONG_VERSION)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "PODFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Drop folder, overrides the configuration file
    #[arg(short, long, env = "PODFLOW_DROP_FOLDER")]
    drop_folder: Option<PathBuf>,

    /// Output base folder, overrides the configuration file
    #[arg(short, long, env = "PODFLOW_OUTPUT_FOLDER")]
    output_folder: Option<PathBuf>,

    /// Classify and match only; nothing is moved, generated or written
    #[arg(long)]
    dry_run: bool,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let (mut config, origin) = PodflowConfig::load_or_default(args.config.as_deref())?;
    if let Some(drop_folder) = args.drop_folder {
        config.drop_folder = Some(drop_folder);
    }
    if let Some(output_folder) = args.output_folder {
        config.output_folder = Some(output_folder);
    }

    podflow_common::logging::init_tracing(&config.logging, "podflow_ingest")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = podflow_ingest::GIT_HASH,
        built = podflow_ingest::BUILD_TIMESTAMP,
        profile = podflow_ingest::BUILD_PROFILE,
        "Starting podflow-ingest"
    );

    match &origin {
        ConfigOrigin::File(path) => info!(path = %path.display(), "Configuration loaded"),
        ConfigOrigin::Defaults => warn!("No configuration file found, using built-in defaults"),
    }

    config.validate().context("Invalid configuration")?;

    let settings = config::pipeline_settings(&config)?;
    let (roster_source, roster_id) = config::roster_source(&config)?;
    let directory = EpisodeDirectory::load(
        roster_source.as_ref(),
        &roster_id,
        &config.roster.sheet_name,
        &config::roster_layout(&config),
    )
    .await
    .context("Failed to load episode roster")?;

    let storage = Arc::new(LocalStorage::new());

    if args.dry_run {
        let actions = plan_pass(&settings, &directory, storage.as_ref())
            .await
            .context("Dry run failed")?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&actions)?);
        } else {
            print_plan(&actions);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let api_key = config::resolve_gemini_api_key(&config)?;
    let generator = Arc::new(config::gemini_client(&config, api_key)?);
    let documents = Arc::new(config::document_store(&config));

    let orchestrator = PipelineOrchestrator::new(settings, directory, storage, generator, documents);
    let summary = orchestrator.run().await.context("Pass aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_summary(summary: &RunSummary) {
    let width = summary
        .reports
        .iter()
        .map(|r| r.input.name().chars().count())
        .max()
        .unwrap_or(0)
        .max("FILE".len());

    println!("{:<width$}  {:<17}  DETAIL", "FILE", "OUTCOME", width = width);
    for report in &summary.reports {
        println!(
            "{:<width$}  {:<17}  {}",
            report.input.name(),
            report.outcome.label(),
            report.detail,
            width = width
        );
    }
    println!(
        "\nrun {}: {} objects, {} failed",
        summary.run_id,
        summary.reports.len(),
        summary.count(podflow_ingest::models::OutcomeKind::Failed)
    );
}

fn print_plan(actions: &[PlannedAction]) {
    let width = actions
        .iter()
        .map(|a| a.input.chars().count())
        .max()
        .unwrap_or(0)
        .max("FILE".len());

    println!("{:<width$}  PLAN", "FILE", width = width);
    for action in actions {
        println!("{:<width$}  {}", action.input, action.note, width = width);
    }
}
