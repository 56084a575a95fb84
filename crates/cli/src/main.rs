mod args;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vulnsync_core::report::ProjectOutcome;
use vulnsync_core::{
    enrich_directory, load_config, resolve_orgs, validate_config, DirectorySource, FsLogSink,
    JiraTracker, ManagerIdCache, RepoDirectory, RestDirectoryClient, RestScanClient, RunReporter,
    RunSummary, ScanApi, TrackerApi,
};

use args::Args;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = args.config_path();
    info!("Loading configuration from {:?}", config_path);
    let mut config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;
    args.apply(&mut config);

    let scanner: Arc<dyn ScanApi> = Arc::new(RestScanClient::new(
        &config.scan.endpoint,
        &config.scan.api_token,
    ));
    let tracker: Arc<dyn TrackerApi> = Arc::new(JiraTracker::new(
        &config.scan.endpoint,
        &config.scan.api_token,
        &config.tracker,
    ));
    let sink = Arc::new(FsLogSink::new(config.run.log_dir.clone()));

    // Load the repository directory. Unreachable directory is fatal; a
    // directory that was never configured just means unassigned tickets.
    let mut directory = if config.directory.enabled() {
        let client = RestDirectoryClient::new(&config.directory.base_url);
        let directory = client
            .load_all(
                config.directory.region.as_deref(),
                config.directory.profile.as_deref(),
            )
            .await
            .context("Could not load the repository directory")?;
        info!("Retrieved {} repos from the directory", directory.len());
        directory
    } else {
        warn!("Repository directory not configured, tickets will be unassigned");
        RepoDirectory::new()
    };

    // Resolve every manager's tracker user id up front
    if !config.tracker.base_url.is_empty() && !directory.is_empty() {
        info!("Resolving tracker user ids for all managers");
        let mut cache = ManagerIdCache::default();
        enrich_directory(&mut directory, tracker.as_ref(), &mut cache).await;
    }

    let orgs = resolve_orgs(scanner.as_ref(), &config.orgs, config.scan.org_id.as_deref())
        .await
        .context("Could not resolve organizations")?;

    let reporter = RunReporter::new(scanner, tracker, sink, &config);
    let summary = reporter
        .run(&orgs, &directory)
        .await
        .context("Run failed")?;

    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        match &report.outcome {
            ProjectOutcome::NoTicketsRequired => {
                println!(
                    "\n----------PROJECT ID {}----------\n No new ticket required\n------------------------------------------",
                    report.project_id
                );
            }
            ProjectOutcome::DryRun { would_create } => {
                println!(
                    "\n----------PROJECT ID {}----------\n Dry run mode: no issue created ({} computed)\n------------------------------------------",
                    report.project_id, would_create
                );
            }
            ProjectOutcome::Created {
                created,
                not_created,
            } => {
                println!(
                    "\n----------PROJECT ID {}----------\n Number of tickets created: {}\n Issue ids without a ticket: {}\n------------------------------------------",
                    report.project_id,
                    created,
                    if not_created.is_empty() {
                        "none".to_string()
                    } else {
                        not_created.join(", ")
                    }
                );
            }
            ProjectOutcome::TotalFailure { not_created } => {
                println!(
                    "\n----------PROJECT ID {}----------\n Failed to create ticket(s)\n Issue ids without a ticket: {}\n------------------------------------------",
                    report.project_id,
                    not_created.join(", ")
                );
            }
        }
    }

    if !summary.skipped.is_empty() {
        println!("\nSkipped projects:");
        for skipped in &summary.skipped {
            println!(
                "  {} ({}, failed at {})",
                skipped.project_id, skipped.org_name, skipped.step
            );
        }
    }

    println!(
        "\nProcessed {} project(s); run log: {}",
        summary.processed_count(),
        summary.log_path.display()
    );

    if summary.dry_run {
        println!(
            "\n********************************************************************\nDry run: the list of computed tickets is in {}\n********************************************************************",
            summary.log_path.display()
        );
    }
}
