//! Trait definitions for the scheduler module.

use async_trait::async_trait;
use std::path::Path;

use super::error::SubmitError;
use super::types::SubmissionReceipt;

/// A batch scheduler that accepts job scripts.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Returns the name of this submitter implementation.
    fn name(&self) -> &str;

    /// Submits the script. Returns once the scheduler accepted or refused it.
    async fn submit(&self, script_path: &Path) -> Result<SubmissionReceipt, SubmitError>;
}
