//! Mock submitter for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::scheduler::{SubmissionReceipt, SubmitError, Submitter};

/// Mock implementation of the Submitter trait.
///
/// Accepts every script that exists and hands out increasing job IDs, unless
/// told to reject.
#[derive(Debug)]
pub struct MockSubmitter {
    submissions: Arc<RwLock<Vec<PathBuf>>>,
    next_job_id: Arc<RwLock<u64>>,
    reject_all: Arc<RwLock<bool>>,
    next_error: Arc<RwLock<Option<SubmitError>>>,
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(RwLock::new(Vec::new())),
            next_job_id: Arc::new(RwLock::new(1000)),
            reject_all: Arc::new(RwLock::new(false)),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Scripts submitted so far, accepted ones only.
    pub async fn recorded_submissions(&self) -> Vec<PathBuf> {
        self.submissions.read().await.clone()
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }

    /// Reject every submission from now on.
    pub async fn set_reject_all(&self, reject: bool) {
        *self.reject_all.write().await = reject;
    }

    /// Configure the next submission to fail with the given error.
    pub async fn set_next_error(&self, error: SubmitError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Submitter for MockSubmitter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, script_path: &Path) -> Result<SubmissionReceipt, SubmitError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if *self.reject_all.read().await {
            return Err(SubmitError::Rejected {
                exit_code: Some(1),
                stderr: "sbatch: error: Batch job submission failed".to_string(),
            });
        }
        if !script_path.is_file() {
            return Err(SubmitError::ScriptNotFound {
                path: script_path.to_path_buf(),
            });
        }

        let mut next = self.next_job_id.write().await;
        let job_id = *next;
        *next += 1;
        drop(next);

        self.submissions
            .write()
            .await
            .push(script_path.to_path_buf());

        Ok(SubmissionReceipt {
            script_path: script_path.to_path_buf(),
            job_id: Some(job_id),
        })
    }
}
