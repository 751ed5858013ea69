//! Error types for tracker access.

use thiserror::Error;

/// Errors that can occur while talking to the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Could not reach the tracker.
    #[error("Connection to tracker failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("Tracker request timed out")]
    Timeout,

    /// Tracker answered with a non-success status.
    #[error("Tracker API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Tracker answered with a body we could not understand.
    #[error("Invalid tracker response: {0}")]
    InvalidResponse(String),

    /// Ticket does not exist (or is not visible to the bot).
    #[error("Ticket not found: {0}")]
    TicketNotFound(u64),

    /// Client could not be constructed.
    #[error("Failed to create tracker client: {0}")]
    Client(String),
}
