//! Issue tracker integration.
//!
//! The dispatcher only needs three operations from the tracker: list the
//! tickets waiting for it, hand a ticket to the bot with a note, and hand it
//! back to its author with a note. [`RedmineTracker`] implements them on top
//! of the Redmine REST API.

mod config;
mod error;
mod redmine;
mod traits;
mod types;

pub use config::{TrackerConfig, TrackerStatuses};
pub use error::TrackerError;
pub use redmine::RedmineTracker;
pub use traits::Tracker;
pub use types::{sign_message, Ticket, TicketAuthor, TicketQuery, TicketStatus};
