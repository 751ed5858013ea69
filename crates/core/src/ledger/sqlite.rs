//! SQLite-backed seen ledger.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::tracker::Ticket;

use super::store::{LedgerError, SeenLedger, SeenTicket};

/// SQLite-backed seen ledger.
pub struct SqliteSeenLedger {
    conn: Mutex<Connection>,
}

impl SqliteSeenLedger {
    /// Open the ledger, creating the database file and table if needed.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory ledger (useful for testing).
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LedgerError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS seen_tickets (
                ticket_id INTEGER PRIMARY KEY,
                subject TEXT NOT NULL,
                author TEXT NOT NULL,
                description TEXT NOT NULL,
                first_seen_at TEXT NOT NULL,
                last_seen_at TEXT NOT NULL,
                times_seen INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_seen_tickets_last_seen ON seen_tickets(last_seen_at);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LedgerError> {
        self.conn
            .lock()
            .map_err(|_| LedgerError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<SeenTicket> {
        let ticket_id: i64 = row.get(0)?;
        let first_seen_at: String = row.get(4)?;
        let last_seen_at: String = row.get(5)?;

        Ok(SeenTicket {
            ticket_id: ticket_id as u64,
            subject: row.get(1)?,
            author: row.get(2)?,
            description: row.get(3)?,
            first_seen_at: parse_timestamp(&first_seen_at),
            last_seen_at: parse_timestamp(&last_seen_at),
            times_seen: row.get(6)?,
        })
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SeenLedger for SqliteSeenLedger {
    fn record(&self, ticket: &Ticket) -> Result<bool, LedgerError> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO seen_tickets
                (ticket_id, subject, author, description, first_seen_at, last_seen_at, times_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, 1)",
            params![
                ticket.id as i64,
                ticket.subject,
                ticket.author.name,
                ticket.description,
                now
            ],
        )?;

        if inserted == 0 {
            conn.execute(
                "UPDATE seen_tickets
                 SET last_seen_at = ?2, times_seen = times_seen + 1, description = ?3
                 WHERE ticket_id = ?1",
                params![ticket.id as i64, now, ticket.description],
            )?;
        }

        Ok(inserted > 0)
    }

    fn contains(&self, ticket_id: u64) -> Result<bool, LedgerError> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM seen_tickets WHERE ticket_id = ?1",
                params![ticket_id as i64],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn get(&self, ticket_id: u64) -> Result<Option<SeenTicket>, LedgerError> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT ticket_id, subject, author, description, first_seen_at, last_seen_at, times_seen
                 FROM seen_tickets WHERE ticket_id = ?1",
                params![ticket_id as i64],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TicketAuthor;
    use tempfile::TempDir;

    fn ticket(id: u64, description: &str) -> Ticket {
        Ticket {
            id,
            subject: "autoclark".to_string(),
            status: "New".to_string(),
            description: description.to_string(),
            author: TicketAuthor {
                id: 7,
                name: "Jane Doe".to_string(),
            },
        }
    }

    #[test]
    fn test_record_new_ticket() {
        let ledger = SqliteSeenLedger::in_memory().unwrap();
        assert!(!ledger.contains(42).unwrap());

        assert!(ledger.record(&ticket(42, "SEQ1")).unwrap());
        assert!(ledger.contains(42).unwrap());

        let entry = ledger.get(42).unwrap().unwrap();
        assert_eq!(entry.author, "Jane Doe");
        assert_eq!(entry.description, "SEQ1");
        assert_eq!(entry.times_seen, 1);
    }

    #[test]
    fn test_record_again_counts() {
        let ledger = SqliteSeenLedger::in_memory().unwrap();
        assert!(ledger.record(&ticket(42, "SEQ1")).unwrap());
        assert!(!ledger.record(&ticket(42, "SEQ1\nSEQ2")).unwrap());

        let entry = ledger.get(42).unwrap().unwrap();
        assert_eq!(entry.times_seen, 2);
        assert_eq!(entry.description, "SEQ1\nSEQ2");
        assert!(entry.last_seen_at >= entry.first_seen_at);
    }

    #[test]
    fn test_get_unknown() {
        let ledger = SqliteSeenLedger::in_memory().unwrap();
        assert!(ledger.get(1).unwrap().is_none());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("seen.db");

        {
            let ledger = SqliteSeenLedger::new(&path).unwrap();
            ledger.record(&ticket(9, "A")).unwrap();
        }

        let ledger = SqliteSeenLedger::new(&path).unwrap();
        assert!(ledger.contains(9).unwrap());
    }
}
