//! Poll loop implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::ledger::SeenLedger;
use crate::processor::{outcome_of, TicketProcessor};
use crate::reconciler::{ReconciliationOutcome, TicketReconciler, TicketSession};
use crate::tracker::{Ticket, TicketQuery, Tracker};

use super::config::PollerConfig;
use super::types::{PollSummary, PollerError, TicketReport};

/// Polls the tracker and dispatches every matching ticket.
pub struct PollLoop {
    config: PollerConfig,
    tracker: Arc<dyn Tracker>,
    ledger: Arc<dyn SeenLedger>,
    processor: Arc<TicketProcessor>,
    reconciler: TicketReconciler,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl PollLoop {
    pub fn new(
        config: PollerConfig,
        tracker: Arc<dyn Tracker>,
        ledger: Arc<dyn SeenLedger>,
        processor: Arc<TicketProcessor>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let reconciler = TicketReconciler::new(Arc::clone(&tracker));

        Self {
            config,
            tracker,
            ledger,
            processor,
            reconciler,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Poll until [`stop`](Self::stop) is called.
    ///
    /// The first poll happens immediately. A cycle in progress is finished
    /// before the loop exits.
    pub async fn run(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Poll loop already running");
            return;
        }

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = Duration::from_secs(self.config.interval_secs);
        info!(
            tracker = self.tracker.name(),
            subject = %self.config.subject,
            interval_secs = self.config.interval_secs,
            "Poll loop started"
        );

        loop {
            match self.poll_once().await {
                Ok(summary) if summary.found > 0 => info!(?summary, "Poll cycle finished"),
                Ok(_) => debug!("No new requests"),
                Err(e) => error!(error = %e, "Poll cycle skipped"),
            }

            if !self.running.load(Ordering::Relaxed) {
                break;
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Poll loop received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    if !self.running.load(Ordering::Relaxed) {
                        break;
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("Poll loop stopped");
    }

    /// Ask a running loop to exit.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Poll loop not running");
            return;
        }
        info!("Stopping poll loop");
        let _ = self.shutdown_tx.send(());
    }

    /// Run one cycle over the current snapshot of new tickets.
    pub async fn poll_once(&self) -> Result<PollSummary, PollerError> {
        let query = TicketQuery::new_tickets(self.config.subject.clone());
        let tickets = self.tracker.find_tickets(&query).await?;

        let mut summary = PollSummary {
            found: tickets.len(),
            ..Default::default()
        };

        for ticket in tickets.into_iter().rev() {
            let report = self.process_ticket(ticket).await;
            summary.record(&report);
        }

        Ok(summary)
    }

    /// Take one ticket from in-progress to its terminal status.
    pub async fn process_ticket(&self, ticket: Ticket) -> TicketReport {
        let ticket_id = ticket.id;
        info!(ticket_id, subject = %ticket.subject, "Found a request to run");

        let first_seen = match self.ledger.record(&ticket) {
            Ok(first) => first,
            Err(e) => {
                warn!(ticket_id, error = %e, "Failed to record ticket in seen ledger");
                true
            }
        };
        if !first_seen {
            warn!(ticket_id, "Ticket was picked up before, processing it again");
        }

        let mut session = TicketSession::new(ticket);
        let outcome = match self.reconciler.mark_in_progress(&mut session).await {
            Ok(()) => outcome_of(&self.processor.process(session.ticket()).await),
            Err(e) => {
                warn!(ticket_id, error = %e, "Failed to mark ticket in progress");
                ReconciliationOutcome::Failed(format!(
                    "[tracker] Could not mark the request as in progress: {}",
                    e
                ))
            }
        };

        if let ReconciliationOutcome::Failed(reason) = &outcome {
            warn!(ticket_id, %reason, "Request failed");
        }

        let final_status = match self.reconciler.reconcile(&mut session, &outcome).await {
            Ok(status) => Some(status),
            Err(e) => {
                error!(ticket_id, error = %e, "Failed to report outcome to tracker");
                None
            }
        };

        TicketReport {
            ticket_id,
            first_seen,
            outcome,
            final_status,
        }
    }
}
