//! Hand-off of submission scripts to the batch scheduler.
//!
//! Submission only tells whether the scheduler accepted the job. What happens
//! to the job afterwards is not observed; the job itself reports back to the
//! ticket through the upload step in its script.

mod config;
mod error;
mod slurm;
mod traits;
mod types;

pub use config::SchedulerConfig;
pub use error::SubmitError;
pub use slurm::{parse_job_id, SlurmSubmitter};
pub use traits::Submitter;
pub use types::SubmissionReceipt;
