//! Per-ticket staging of input data and submission scripts.
//!
//! For every ticket the stager creates `{root}/{ticket_id}`, writes the SEQID
//! manifest, runs the retrieval tool matching the request kind, then renders
//! the submission script from the job template and copies the upload tooling
//! next to it so the job can run on a node without the dispatcher's working
//! directory.
//!
//! A staging directory that already exists is never reused: it means the
//! ticket is being (or was) processed elsewhere. Failed stagings are left on
//! disk as they are for post-mortem inspection.

mod config;
mod error;
mod retriever;
mod stager;
mod template;
mod types;

pub use config::{fill_placeholders, CommandSpec, JobConfig, RetrievalConfig, StagingConfig};
pub use error::{StagingError, StagingFailure, StagingProgress};
pub(crate) use error::exit_label;
pub use retriever::{CommandRetriever, RetrievalOutcome, RetrievalRequest, Retriever};
pub use stager::JobStager;
pub use template::{JobTemplate, SubmissionScript};
pub use types::{StagedRequest, SubmissionJob};
