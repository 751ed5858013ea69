//! Staging result types.

use std::path::PathBuf;

use crate::request::RequestKind;

use super::error::StagingProgress;
use super::retriever::RetrievalOutcome;
use super::template::SubmissionScript;

/// A staging directory with manifest and retrieved data in place.
#[derive(Debug, Clone)]
pub struct StagedRequest {
    pub ticket_id: u64,
    pub kind: RequestKind,
    pub staging_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub retrieval: RetrievalOutcome,
    pub progress: StagingProgress,
}

/// A submission script written to disk and ready for the scheduler.
#[derive(Debug, Clone)]
pub struct SubmissionJob {
    pub ticket_id: u64,
    pub job_name: String,
    pub script_path: PathBuf,
    pub script: SubmissionScript,
}
