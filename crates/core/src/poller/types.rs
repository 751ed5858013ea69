//! Types for the poller module.

use serde::Serialize;
use thiserror::Error;

use crate::reconciler::ReconciliationOutcome;
use crate::tracker::{TicketStatus, TrackerError};

/// Errors that abort a poll cycle.
#[derive(Debug, Error)]
pub enum PollerError {
    /// Tracker could not be queried.
    #[error("Failed to query tracker: {0}")]
    Query(#[from] TrackerError),
}

/// What happened to one ticket in a cycle.
#[derive(Debug, Clone)]
pub struct TicketReport {
    pub ticket_id: u64,
    /// False when the ledger already knew the ticket.
    pub first_seen: bool,
    pub outcome: ReconciliationOutcome,
    /// Status written to the tracker; `None` if the terminal update failed.
    pub final_status: Option<TicketStatus>,
}

/// Counts for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub found: usize,
    pub submitted: usize,
    pub partially_missing: usize,
    pub failed: usize,
    /// Tickets whose terminal tracker update failed.
    pub unreconciled: usize,
}

impl PollSummary {
    pub fn record(&mut self, report: &TicketReport) {
        match report.outcome {
            ReconciliationOutcome::Submitted => self.submitted += 1,
            ReconciliationOutcome::PartiallyMissingData(_) => self.partially_missing += 1,
            ReconciliationOutcome::Failed(_) => self.failed += 1,
        }
        if report.final_status.is_none() {
            self.unreconciled += 1;
        }
    }
}
