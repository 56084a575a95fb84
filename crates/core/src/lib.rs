pub mod config;
pub mod delta;
pub mod directory;
pub mod logfile;
pub mod maturity;
pub mod opener;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod testing;
pub mod tracker;

pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use delta::{compute_delta, DeltaResult};
pub use directory::{
    enrich_directory, DirectoryError, DirectorySource, ManagerIdCache, RepoDirectory, RepoRecord,
    RestDirectoryClient,
};
pub use logfile::{FsLogSink, LogError, LogSink};
pub use maturity::MaturityFilter;
pub use opener::{TicketCreationResult, TicketOpener};
pub use report::{
    ProjectOutcome, ProjectReport, ReportError, RunLog, RunReporter, RunSummary, SkippedProject,
};
pub use resolver::{resolve_orgs, resolve_projects, ResolveError, PINNED_ORG_NAME};
pub use scanner::{
    Organization, ProjectFilters, ProjectInfo, ProjectRef, RestScanClient, ScanApi, ScanError,
    VulnRecord, Vulnerability,
};
pub use tracker::{
    CreatedTicket, ExistingTicket, JiraTracker, TicketSpec, TrackerApi, TrackerError,
};
