//! Poller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the poll loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Seconds to sleep between two polls.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Ticket subject the dispatcher responds to (case-insensitive).
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_interval() -> u64 {
    60
}

fn default_subject() -> String {
    "autoclark".to_string()
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            subject: default_subject(),
        }
    }
}
