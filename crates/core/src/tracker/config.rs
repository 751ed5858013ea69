//! Tracker connection configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Redmine tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Base URL of the tracker (e.g., "https://redmine.example.org").
    pub url: String,

    /// API key used for every request.
    pub api_key: String,

    /// User ID tickets are assigned to while the bot works on them.
    /// When unset, the user owning the API key is looked up once.
    #[serde(default)]
    pub bot_user_id: Option<u64>,

    /// Suffix appended to every note the bot writes.
    #[serde(default = "default_signature")]
    pub bot_signature: String,

    /// Numeric status IDs of the tracker's workflow.
    #[serde(default)]
    pub statuses: TrackerStatuses,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Page size used when listing issues.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

/// Status IDs used by the tracker's workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackerStatuses {
    #[serde(default = "default_new")]
    pub new: u64,
    #[serde(default = "default_in_progress")]
    pub in_progress: u64,
    #[serde(default = "default_feedback")]
    pub feedback: u64,
    /// Status for tickets whose job was handed to the cluster.
    /// Same as feedback unless the workflow has a dedicated status.
    #[serde(default = "default_feedback")]
    pub awaiting_result: u64,
}

fn default_signature() -> String {
    "\n\n_I am a bot. This action was performed automatically._".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_limit() -> u32 {
    100
}

fn default_new() -> u64 {
    1
}

fn default_in_progress() -> u64 {
    2
}

fn default_feedback() -> u64 {
    4
}

impl Default for TrackerStatuses {
    fn default() -> Self {
        Self {
            new: default_new(),
            in_progress: default_in_progress(),
            feedback: default_feedback(),
            awaiting_result: default_feedback(),
        }
    }
}
