//! Reconciliation types.

use thiserror::Error;

use crate::availability::AvailabilityReport;
use crate::tracker::{Ticket, TicketStatus, TrackerError};

/// How the pipeline ended for a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// Job handed to the scheduler with all data present.
    Submitted,
    /// Job handed to the scheduler, but some identifiers had no data.
    PartiallyMissingData(AvailabilityReport),
    /// Pipeline stopped; the reason is shown to the author.
    Failed(String),
}

impl ReconciliationOutcome {
    /// Status the ticket ends in.
    pub fn terminal_status(&self) -> TicketStatus {
        match self {
            Self::Submitted | Self::PartiallyMissingData(_) => TicketStatus::AwaitingJobResult,
            Self::Failed(_) => TicketStatus::Feedback,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::PartiallyMissingData(_) => "partially_missing_data",
            Self::Failed(_) => "failed",
        }
    }
}

/// Errors from reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Terminal update already sent this cycle.
    #[error("Ticket {ticket_id} was already reconciled as {status}")]
    AlreadyReconciled {
        ticket_id: u64,
        status: TicketStatus,
    },

    /// Transition not allowed from the current status.
    #[error("Ticket {ticket_id} cannot move from {from} to {to}")]
    InvalidTransition {
        ticket_id: u64,
        from: TicketStatus,
        to: TicketStatus,
    },

    /// Tracker rejected the update.
    #[error("Tracker update failed: {0}")]
    Tracker(#[from] TrackerError),
}

/// One ticket's progress through a processing cycle.
#[derive(Debug, Clone)]
pub struct TicketSession {
    ticket: Ticket,
    status: TicketStatus,
}

impl TicketSession {
    pub fn new(ticket: Ticket) -> Self {
        Self {
            ticket,
            status: TicketStatus::New,
        }
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// Last status successfully written to the tracker.
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    pub fn is_reconciled(&self) -> bool {
        self.status.is_terminal()
    }

    pub(super) fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
    }
}
