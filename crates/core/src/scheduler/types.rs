//! Submission types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Proof that the scheduler accepted a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub script_path: PathBuf,
    /// Scheduler job ID, when the scheduler printed one.
    pub job_id: Option<u64>,
}
