//! Presence checks for retrieved sequence data.
//!
//! After the retrieval tools have run, every requested SEQID must have its
//! data in place: both read mates for raw reads, one FASTA file for
//! assembled sequences. The checker only looks at file names; it cannot tell
//! a SEQID that never existed from one the retrieval tool failed to copy.

mod checker;
mod pattern;

pub use checker::{AvailabilityChecker, AvailabilityConfig, AvailabilityError, AvailabilityReport};
pub use pattern::FilePattern;
