//! Submission errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::staging::exit_label;

/// Errors that can occur when submitting a job.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Script to submit does not exist.
    #[error("Submission script not found: {path}")]
    ScriptNotFound { path: PathBuf },

    /// Submission program could not be started.
    #[error("Failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Scheduler refused the job.
    #[error("Scheduler rejected the job (exited with {}): {}", exit_label(.exit_code), .stderr)]
    Rejected {
        exit_code: Option<i32>,
        stderr: String,
    },
}
