//! Ticket reconciler.

use std::sync::Arc;
use tracing::{info, warn};

use crate::tracker::{TicketStatus, Tracker};

use super::messages::{
    failure_message, in_progress_message, missing_data_warning, submitted_message,
};
use super::types::{ReconcileError, ReconciliationOutcome, TicketSession};

/// Writes ticket status transitions and notes to the tracker.
pub struct TicketReconciler {
    tracker: Arc<dyn Tracker>,
}

impl TicketReconciler {
    pub fn new(tracker: Arc<dyn Tracker>) -> Self {
        Self { tracker }
    }

    /// Assign the ticket to the bot and mark it in progress.
    pub async fn mark_in_progress(
        &self,
        session: &mut TicketSession,
    ) -> Result<(), ReconcileError> {
        if session.status() != TicketStatus::New {
            return Err(ReconcileError::InvalidTransition {
                ticket_id: session.ticket().id,
                from: session.status(),
                to: TicketStatus::InProgress,
            });
        }

        let ticket = session.ticket();
        self.tracker
            .assign_to_bot(ticket, &in_progress_message(&ticket.subject))
            .await?;
        session.set_status(TicketStatus::InProgress);
        Ok(())
    }

    /// Send the terminal update for the outcome.
    ///
    /// Allowed from `New` as well as `InProgress`, so a ticket whose
    /// in-progress update failed is still handed back. Missing data is
    /// announced in a separate note first; if that note fails the terminal
    /// update is sent anyway.
    pub async fn reconcile(
        &self,
        session: &mut TicketSession,
        outcome: &ReconciliationOutcome,
    ) -> Result<TicketStatus, ReconcileError> {
        let ticket_id = session.ticket().id;
        if session.is_reconciled() {
            return Err(ReconcileError::AlreadyReconciled {
                ticket_id,
                status: session.status(),
            });
        }

        let status = outcome.terminal_status();
        let message = match outcome {
            ReconciliationOutcome::Submitted => submitted_message(None),
            ReconciliationOutcome::PartiallyMissingData(report) => {
                let warning = missing_data_warning(report);
                if let Err(e) = self.tracker.assign_to_bot(session.ticket(), &warning).await {
                    warn!(ticket_id, error = %e, "Failed to post missing data warning");
                }
                submitted_message(Some(report))
            }
            ReconciliationOutcome::Failed(reason) => failure_message(reason),
        };

        self.tracker
            .assign_to_author(session.ticket(), status, &message)
            .await?;
        session.set_status(status);

        info!(
            ticket_id,
            outcome = outcome.label(),
            %status,
            "Ticket handed back to author"
        );

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityReport;
    use crate::request::RequestKind;
    use crate::testing::{fixtures, MockTracker, TrackerCall};
    use crate::tracker::TrackerError;

    fn setup() -> (Arc<MockTracker>, TicketReconciler, TicketSession) {
        let tracker = Arc::new(MockTracker::new());
        let reconciler = TicketReconciler::new(tracker.clone());
        let session = TicketSession::new(fixtures::ticket(42, "SEQID001"));
        (tracker, reconciler, session)
    }

    #[tokio::test]
    async fn test_submitted_path() {
        let (tracker, reconciler, mut session) = setup();

        reconciler.mark_in_progress(&mut session).await.unwrap();
        assert_eq!(session.status(), TicketStatus::InProgress);

        let status = reconciler
            .reconcile(&mut session, &ReconciliationOutcome::Submitted)
            .await
            .unwrap();
        assert_eq!(status, TicketStatus::AwaitingJobResult);

        let calls = tracker.recorded_calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].call, TrackerCall::AssignToBot);
        assert_eq!(calls[0].message, "Beginning the process for: autoclark");
        assert_eq!(
            calls[1].call,
            TrackerCall::AssignToAuthor(TicketStatus::AwaitingJobResult)
        );
        assert_eq!(calls[1].message, submitted_message(None));
    }

    #[tokio::test]
    async fn test_partial_data_sends_warning_then_submitted() {
        let (tracker, reconciler, mut session) = setup();
        reconciler.mark_in_progress(&mut session).await.unwrap();

        let report = AvailabilityReport {
            kind: RequestKind::RawReads,
            missing: vec!["SEQID002".to_string()],
            checked: 2,
        };
        reconciler
            .reconcile(
                &mut session,
                &ReconciliationOutcome::PartiallyMissingData(report),
            )
            .await
            .unwrap();

        let calls = tracker.recorded_calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].call, TrackerCall::AssignToBot);
        assert!(calls[1].message.contains("SEQID002"));
        assert_eq!(
            calls[2].call,
            TrackerCall::AssignToAuthor(TicketStatus::AwaitingJobResult)
        );
        assert!(calls[2].message.contains("WARNING"));
    }

    #[tokio::test]
    async fn test_failed_goes_to_feedback() {
        let (tracker, reconciler, mut session) = setup();
        reconciler.mark_in_progress(&mut session).await.unwrap();

        let status = reconciler
            .reconcile(
                &mut session,
                &ReconciliationOutcome::Failed("Staging directory already exists".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(status, TicketStatus::Feedback);
        let calls = tracker.recorded_calls().await;
        assert_eq!(calls[1].call, TrackerCall::AssignToAuthor(TicketStatus::Feedback));
        assert!(calls[1].message.contains("Staging directory already exists"));
    }

    #[tokio::test]
    async fn test_second_terminal_transition_is_rejected() {
        let (tracker, reconciler, mut session) = setup();
        reconciler.mark_in_progress(&mut session).await.unwrap();
        reconciler
            .reconcile(&mut session, &ReconciliationOutcome::Submitted)
            .await
            .unwrap();

        let err = reconciler
            .reconcile(&mut session, &ReconciliationOutcome::Failed("late".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReconcileError::AlreadyReconciled {
                ticket_id: 42,
                status: TicketStatus::AwaitingJobResult
            }
        ));
        assert_eq!(tracker.recorded_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_in_progress_twice_is_invalid() {
        let (_tracker, reconciler, mut session) = setup();
        reconciler.mark_in_progress(&mut session).await.unwrap();
        let err = reconciler.mark_in_progress(&mut session).await.unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_reconcile_from_new_after_failed_in_progress() {
        let (tracker, reconciler, mut session) = setup();
        tracker
            .set_next_error(TrackerError::ConnectionFailed("down".to_string()))
            .await;

        assert!(reconciler.mark_in_progress(&mut session).await.is_err());
        assert_eq!(session.status(), TicketStatus::New);

        let status = reconciler
            .reconcile(&mut session, &ReconciliationOutcome::Failed("tracker".to_string()))
            .await
            .unwrap();
        assert_eq!(status, TicketStatus::Feedback);
    }

    #[tokio::test]
    async fn test_failed_terminal_update_leaves_session_open() {
        let (tracker, reconciler, mut session) = setup();
        reconciler.mark_in_progress(&mut session).await.unwrap();
        tracker.set_next_error(TrackerError::Timeout).await;

        let result = reconciler
            .reconcile(&mut session, &ReconciliationOutcome::Submitted)
            .await;

        assert!(matches!(result, Err(ReconcileError::Tracker(TrackerError::Timeout))));
        assert!(!session.is_reconciled());
    }

    #[tokio::test]
    async fn test_warning_failure_does_not_block_terminal_update() {
        let (tracker, reconciler, mut session) = setup();
        reconciler.mark_in_progress(&mut session).await.unwrap();
        tracker
            .set_next_error(TrackerError::ApiError {
                status: 500,
                message: "oops".to_string(),
            })
            .await;

        let report = AvailabilityReport {
            kind: RequestKind::RawReads,
            missing: vec!["A".to_string()],
            checked: 1,
        };
        let status = reconciler
            .reconcile(
                &mut session,
                &ReconciliationOutcome::PartiallyMissingData(report),
            )
            .await
            .unwrap();

        assert_eq!(status, TicketStatus::AwaitingJobResult);
        assert!(session.is_reconciled());
    }
}
