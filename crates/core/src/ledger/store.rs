//! Seen-ledger trait and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tracker::Ticket;

/// Errors from the seen ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        LedgerError::Database(e.to_string())
    }
}

/// A ticket as first recorded by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenTicket {
    pub ticket_id: u64,
    pub subject: String,
    pub author: String,
    pub description: String,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    /// How many times the ticket was picked up.
    pub times_seen: u32,
}

/// Record of tickets the dispatcher has started on.
pub trait SeenLedger: Send + Sync {
    /// Record that processing of the ticket starts now.
    ///
    /// Returns `true` the first time a ticket is recorded.
    fn record(&self, ticket: &Ticket) -> Result<bool, LedgerError>;

    /// Whether the ticket was recorded before.
    fn contains(&self, ticket_id: u64) -> Result<bool, LedgerError>;

    /// Get the entry for a ticket.
    fn get(&self, ticket_id: u64) -> Result<Option<SeenTicket>, LedgerError>;
}
