use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::availability::AvailabilityConfig;
use crate::poller::PollerConfig;
use crate::request::RequestConfig;
use crate::scheduler::SchedulerConfig;
use crate::staging::{JobConfig, RetrievalConfig, StagingConfig};
use crate::tracker::{TrackerConfig, TrackerStatuses};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
    #[serde(default)]
    pub job: JobConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Seen-ledger database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("autoclark.db")
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub tracker: SanitizedTrackerConfig,
    pub poller: PollerConfig,
    pub request: RequestConfig,
    pub staging: StagingConfig,
    pub retrieval: RetrievalConfig,
    pub availability: AvailabilityConfig,
    pub job: JobConfig,
    pub scheduler: SchedulerConfig,
    pub database: DatabaseConfig,
}

/// Sanitized tracker config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTrackerConfig {
    pub url: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_user_id: Option<u64>,
    pub statuses: TrackerStatuses,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            tracker: SanitizedTrackerConfig {
                url: config.tracker.url.clone(),
                api_key_configured: !config.tracker.api_key.is_empty(),
                bot_user_id: config.tracker.bot_user_id,
                statuses: config.tracker.statuses.clone(),
                timeout_secs: config.tracker.timeout_secs,
            },
            poller: config.poller.clone(),
            request: config.request.clone(),
            staging: config.staging.clone(),
            retrieval: config.retrieval.clone(),
            availability: config.availability.clone(),
            job: config.job.clone(),
            scheduler: config.scheduler.clone(),
            database: config.database.clone(),
        }
    }
}
