//! Ticket data types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketAuthor {
    pub id: u64,
    pub name: String,
}

/// A ticket as read from the tracker.
///
/// This is a snapshot taken at poll time; the tracker owns the real record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Numeric ticket ID.
    pub id: u64,
    /// Ticket subject.
    pub subject: String,
    /// Status name at poll time.
    pub status: String,
    /// Free-text description, one SEQID per line.
    pub description: String,
    /// Who filed the ticket.
    pub author: TicketAuthor,
}

/// Workflow status the dispatcher moves tickets between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Filed and waiting for the dispatcher.
    New,
    /// Picked up by the dispatcher.
    InProgress,
    /// Job handed to the cluster, results will follow.
    AwaitingJobResult,
    /// Returned to the author because the request failed.
    Feedback,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::AwaitingJobResult => "awaiting_job_result",
            TicketStatus::Feedback => "feedback",
        }
    }

    /// Whether the dispatcher is done with the ticket for this cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::AwaitingJobResult | TicketStatus::Feedback)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which tickets a poll should pick up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    /// Subject token; compared trimmed and case-insensitively.
    pub subject: String,
    /// Required status.
    pub status: TicketStatus,
}

impl TicketQuery {
    /// Query for new tickets with the given subject token.
    pub fn new_tickets(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            status: TicketStatus::New,
        }
    }

    /// Whether a ticket subject matches the token.
    pub fn matches_subject(&self, subject: &str) -> bool {
        subject.trim().eq_ignore_ascii_case(self.subject.trim())
    }
}

/// Append the bot signature to a note.
pub fn sign_message(message: &str, signature: &str) -> String {
    format!("{}{}", message, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_match_is_case_insensitive() {
        let query = TicketQuery::new_tickets("autoclark");
        assert!(query.matches_subject("AutoCLARK"));
        assert!(query.matches_subject("  autoclark \n"));
        assert!(!query.matches_subject("autoclark please"));
        assert!(!query.matches_subject("autoassemble"));
    }

    #[test]
    fn test_new_tickets_query_status() {
        let query = TicketQuery::new_tickets("autoclark");
        assert_eq!(query.status, TicketStatus::New);
    }

    #[test]
    fn test_sign_message() {
        let signed = sign_message("Done.", "\n\n_bot_");
        assert_eq!(signed, "Done.\n\n_bot_");
    }

    #[test]
    fn test_ticket_status_serialization() {
        let json = serde_json::to_string(&TicketStatus::AwaitingJobResult).unwrap();
        assert_eq!(json, "\"awaiting_job_result\"");
        assert_eq!(TicketStatus::Feedback.to_string(), "feedback");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TicketStatus::New.is_terminal());
        assert!(!TicketStatus::InProgress.is_terminal());
        assert!(TicketStatus::AwaitingJobResult.is_terminal());
        assert!(TicketStatus::Feedback.is_terminal());
    }
}
