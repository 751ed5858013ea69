//! Reporting pipeline outcomes back to the tracker.
//!
//! Each ticket moves `New -> InProgress -> AwaitingJobResult | Feedback`
//! within one processing cycle. The terminal transition happens once: the
//! reconciler refuses a second one for the same [`TicketSession`] without
//! touching the tracker.

mod messages;
mod reconcile;
mod types;

pub use messages::{
    failure_message, in_progress_message, missing_data_warning, submitted_message,
    SUBMITTED_MESSAGE,
};
pub use reconcile::TicketReconciler;
pub use types::{ReconcileError, ReconciliationOutcome, TicketSession};
