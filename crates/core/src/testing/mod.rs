//! Testing utilities and mock implementations.
//!
//! Mocks for the tracker, the retrieval tools and the scheduler, so the whole
//! pipeline can run against a temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use autoclark_core::testing::{fixtures, MockRetriever, MockSubmitter, MockTracker};
//!
//! let tracker = MockTracker::new();
//! tracker.add_ticket(fixtures::ticket(42, "SEQID001\nSEQID002")).await;
//!
//! let retriever = MockRetriever::new();
//! retriever.make_available(&["SEQID001"]).await;
//!
//! let submitter = MockSubmitter::new();
//! ```

mod mock_retriever;
mod mock_submitter;
mod mock_tracker;

pub use mock_retriever::MockRetriever;
pub use mock_submitter::MockSubmitter;
pub use mock_tracker::{MockTracker, RecordedTrackerCall, TrackerCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::tracker::{Ticket, TicketAuthor};

    /// A new "autoclark" ticket filed by a test author.
    pub fn ticket(id: u64, description: &str) -> Ticket {
        Ticket {
            id,
            subject: "autoclark".to_string(),
            status: "New".to_string(),
            description: description.to_string(),
            author: TicketAuthor {
                id: 7,
                name: "Test Author".to_string(),
            },
        }
    }

    /// Minimal scheduler script template using the default job-name token.
    pub const JOB_TEMPLATE: &str = "#!/bin/bash\n\
        #SBATCH -N 1\n\
        #SBATCH --ntasks=4\n\
        #SBATCH --job-name=CLARK_JOB_NAME\n\
        \n\
        source activate clark\n";
}
