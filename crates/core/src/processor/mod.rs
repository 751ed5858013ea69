//! Single-ticket pipeline.
//!
//! [`TicketProcessor::process`] runs parse, stage, check, script and submit
//! for one ticket and returns either what was submitted or a typed
//! [`PipelineError`]. It never touches the tracker; turning the result into
//! a ticket update is the reconciler's job.

mod pipeline;
mod types;

pub use pipeline::TicketProcessor;
pub use types::{outcome_of, PipelineError, ProcessedTicket};
