//! Periodic polling of the tracker.
//!
//! Each cycle lists the new tickets with the configured subject and runs
//! them one at a time, last listed first, through the processor and the
//! reconciler. A failing ticket is reported back to its author and the
//! cycle moves on; a failing tracker query skips the cycle.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use autoclark_core::poller::{PollLoop, PollerConfig};
//!
//! let poll_loop = Arc::new(PollLoop::new(config, tracker, ledger, processor));
//!
//! let runner = Arc::clone(&poll_loop);
//! let handle = tokio::spawn(async move { runner.run().await });
//!
//! // later
//! poll_loop.stop();
//! handle.await?;
//! ```

mod config;
mod runner;
mod types;

pub use config::PollerConfig;
pub use runner::PollLoop;
pub use types::{PollSummary, PollerError, TicketReport};
