pub mod availability;
pub mod config;
pub mod ledger;
pub mod poller;
pub mod processor;
pub mod reconciler;
pub mod request;
pub mod scheduler;
pub mod staging;
pub mod testing;
pub mod tracker;

pub use availability::{AvailabilityChecker, AvailabilityConfig, AvailabilityReport};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    SanitizedConfig,
};
pub use ledger::{SeenLedger, SqliteSeenLedger};
pub use poller::{PollLoop, PollSummary, PollerConfig};
pub use processor::{PipelineError, ProcessedTicket, TicketProcessor};
pub use reconciler::{ReconciliationOutcome, TicketReconciler};
pub use request::{parse_request, RequestKind, WorkRequest};
pub use scheduler::{SlurmSubmitter, Submitter};
pub use staging::{CommandRetriever, JobStager, Retriever};
pub use tracker::{RedmineTracker, Ticket, Tracker};
