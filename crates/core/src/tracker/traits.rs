//! Trait definitions for the tracker module.

use async_trait::async_trait;

use super::error::TrackerError;
use super::types::{Ticket, TicketQuery, TicketStatus};

/// An issue tracker the dispatcher takes requests from.
///
/// Both mutations append the bot signature to the message.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Returns the name of this tracker implementation.
    fn name(&self) -> &str;

    /// Lists the tickets matching the query, in the tracker's listing order.
    async fn find_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, TrackerError>;

    /// Assigns the ticket to the bot, sets it in progress and adds a note.
    async fn assign_to_bot(&self, ticket: &Ticket, message: &str) -> Result<(), TrackerError>;

    /// Assigns the ticket back to its author with the given status and a note.
    async fn assign_to_author(
        &self,
        ticket: &Ticket,
        status: TicketStatus,
        message: &str,
    ) -> Result<(), TrackerError>;
}
