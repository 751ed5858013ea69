//! Types for the processor module.

use thiserror::Error;

use crate::availability::{AvailabilityError, AvailabilityReport};
use crate::reconciler::ReconciliationOutcome;
use crate::request::WorkRequest;
use crate::scheduler::{SubmissionReceipt, SubmitError};
use crate::staging::{StagingFailure, SubmissionJob};

/// Why a ticket's pipeline stopped.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Staging failed (directory collision, retrieval, template, I/O).
    #[error("{0}")]
    Staging(#[from] StagingFailure),

    /// Staging directory could not be inspected.
    #[error("Availability check failed: {0}")]
    Availability(#[from] AvailabilityError),

    /// Scheduler did not accept the job.
    #[error("Job submission failed: {0}")]
    Submission(#[from] SubmitError),
}

impl PipelineError {
    /// Failure category: precondition, retrieval, template, staging,
    /// availability or submission.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Staging(failure) => failure.error.category(),
            Self::Availability(_) => "availability",
            Self::Submission(_) => "submission",
        }
    }

    /// Text shown to the ticket author.
    pub fn diagnostic(&self) -> String {
        format!("[{}] {}", self.category(), self)
    }
}

/// A ticket whose job the scheduler accepted.
#[derive(Debug, Clone)]
pub struct ProcessedTicket {
    pub request: WorkRequest,
    pub report: AvailabilityReport,
    pub job: SubmissionJob,
    pub receipt: SubmissionReceipt,
}

impl ProcessedTicket {
    pub fn outcome(&self) -> ReconciliationOutcome {
        if self.report.is_complete() {
            ReconciliationOutcome::Submitted
        } else {
            ReconciliationOutcome::PartiallyMissingData(self.report.clone())
        }
    }
}

/// Reconciliation outcome for a pipeline result.
pub fn outcome_of(result: &Result<ProcessedTicket, PipelineError>) -> ReconciliationOutcome {
    match result {
        Ok(processed) => processed.outcome(),
        Err(e) => ReconciliationOutcome::Failed(e.diagnostic()),
    }
}
