use std::path::PathBuf;

use clap::Parser;
use vulnsync_core::Config;

/// Reconciles open vulnerabilities against the issue tracker, creating
/// tickets for findings that do not have one yet.
#[derive(Debug, Parser)]
#[command(name = "vulnsync", version)]
pub struct Args {
    /// Path to the configuration file (defaults to $VULNSYNC_CONFIG,
    /// then ./vulnsync.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Process only this organization id
    #[arg(long)]
    pub org_id: Option<String>,

    /// Process only this project id
    #[arg(long)]
    pub project_id: Option<String>,

    /// Comma-separated business criticality allow-list
    #[arg(long)]
    pub criticality: Option<String>,

    /// Comma-separated environment allow-list
    #[arg(long)]
    pub environment: Option<String>,

    /// Comma-separated lifecycle allow-list
    #[arg(long)]
    pub lifecycle: Option<String>,

    /// Comma-separated accepted maturity levels (empty accepts all)
    #[arg(long)]
    pub maturity_filter: Option<String>,

    /// Compute tickets but do not create them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Overlay command-line values on the loaded configuration.
    /// Flags win over file and environment values.
    pub fn apply(&self, config: &mut Config) {
        if self.org_id.is_some() {
            config.scan.org_id = self.org_id.clone();
        }
        if self.project_id.is_some() {
            config.scan.project_id = self.project_id.clone();
        }
        if self.criticality.is_some() {
            config.scan.criticality = self.criticality.clone();
        }
        if self.environment.is_some() {
            config.scan.environment = self.environment.clone();
        }
        if self.lifecycle.is_some() {
            config.scan.lifecycle = self.lifecycle.clone();
        }
        if let Some(maturity) = &self.maturity_filter {
            config.scan.maturity_levels = maturity.clone();
        }
        if self.dry_run {
            config.run.dry_run = true;
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .or_else(|| std::env::var("VULNSYNC_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("vulnsync.toml"))
    }
}
