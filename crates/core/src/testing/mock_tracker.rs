//! Mock tracker for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tracker::{Ticket, TicketQuery, TicketStatus, Tracker, TrackerError};

/// Which tracker mutation was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerCall {
    AssignToBot,
    AssignToAuthor(TicketStatus),
}

/// A recorded tracker mutation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTrackerCall {
    pub ticket_id: u64,
    pub call: TrackerCall,
    /// Message as passed in, without the bot signature.
    pub message: String,
}

#[derive(Debug, Clone)]
struct StoredTicket {
    ticket: Ticket,
    status: TicketStatus,
}

/// Mock implementation of the Tracker trait.
///
/// Holds tickets in memory, applies status changes so later queries see
/// them, and records every successful mutation.
///
/// # Example
///
/// ```rust,ignore
/// use autoclark_core::testing::{fixtures, MockTracker};
///
/// let tracker = MockTracker::new();
/// tracker.add_ticket(fixtures::ticket(42, "SEQID001")).await;
///
/// // ... run a poll ...
///
/// let calls = tracker.calls_for(42).await;
/// assert_eq!(calls.len(), 2);
/// ```
#[derive(Debug)]
pub struct MockTracker {
    tickets: Arc<RwLock<Vec<StoredTicket>>>,
    calls: Arc<RwLock<Vec<RecordedTrackerCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<TrackerError>>>,
    /// Tickets whose mutations always fail.
    failing_tickets: Arc<RwLock<HashSet<u64>>>,
}

impl Default for MockTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTracker {
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_tickets: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Add a ticket in the `New` status.
    pub async fn add_ticket(&self, ticket: Ticket) {
        self.tickets.write().await.push(StoredTicket {
            ticket,
            status: TicketStatus::New,
        });
    }

    /// Current status of a ticket.
    pub async fn status_of(&self, ticket_id: u64) -> Option<TicketStatus> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|t| t.ticket.id == ticket_id)
            .map(|t| t.status)
    }

    /// Force a ticket's status.
    pub async fn set_status(&self, ticket_id: u64, status: TicketStatus) {
        if let Some(stored) = self
            .tickets
            .write()
            .await
            .iter_mut()
            .find(|t| t.ticket.id == ticket_id)
        {
            stored.status = status;
        }
    }

    /// Get all recorded mutations.
    pub async fn recorded_calls(&self) -> Vec<RecordedTrackerCall> {
        self.calls.read().await.clone()
    }

    /// Recorded mutations of one ticket.
    pub async fn calls_for(&self, ticket_id: u64) -> Vec<RecordedTrackerCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: TrackerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every mutation of a ticket fail.
    pub async fn fail_updates_for(&self, ticket_id: u64) {
        self.failing_tickets.write().await.insert(ticket_id);
    }

    async fn take_error(&self) -> Option<TrackerError> {
        self.next_error.write().await.take()
    }

    async fn mutate(
        &self,
        ticket: &Ticket,
        call: TrackerCall,
        status: TicketStatus,
        message: &str,
    ) -> Result<(), TrackerError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if self.failing_tickets.read().await.contains(&ticket.id) {
            return Err(TrackerError::ApiError {
                status: 500,
                message: format!("mock failure for ticket {}", ticket.id),
            });
        }

        self.set_status(ticket.id, status).await;

        self.calls.write().await.push(RecordedTrackerCall {
            ticket_id: ticket.id,
            call,
            message: message.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl Tracker for MockTracker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn find_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, TrackerError> {
        if let Some(error) = self.take_error().await {
            return Err(error);
        }

        Ok(self
            .tickets
            .read()
            .await
            .iter()
            .filter(|t| t.status == query.status && query.matches_subject(&t.ticket.subject))
            .map(|t| t.ticket.clone())
            .collect())
    }

    async fn assign_to_bot(&self, ticket: &Ticket, message: &str) -> Result<(), TrackerError> {
        self.mutate(ticket, TrackerCall::AssignToBot, TicketStatus::InProgress, message)
            .await
    }

    async fn assign_to_author(
        &self,
        ticket: &Ticket,
        status: TicketStatus,
        message: &str,
    ) -> Result<(), TrackerError> {
        self.mutate(ticket, TrackerCall::AssignToAuthor(status), status, message)
            .await
    }
}
