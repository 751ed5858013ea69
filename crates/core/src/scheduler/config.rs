//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Submission program (default: "sbatch").
    #[serde(default = "default_submit_program")]
    pub submit_program: String,

    /// Arguments placed before the script path.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_submit_program() -> String {
    "sbatch".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            submit_program: default_submit_program(),
            extra_args: Vec::new(),
        }
    }
}
