//! Local record of every ticket the dispatcher has picked up.
//!
//! The tracker stays the source of truth for ticket state. The ledger only
//! answers "have we started on this ticket before?", which is useful when a
//! tracker update was lost and the same ticket shows up as new again.

mod sqlite;
mod store;

pub use sqlite::SqliteSeenLedger;
pub use store::{LedgerError, SeenLedger, SeenTicket};
