//! Slurm `sbatch` submitter.

use async_trait::async_trait;
use regex_lite::Regex;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use super::config::SchedulerConfig;
use super::error::SubmitError;
use super::traits::Submitter;
use super::types::SubmissionReceipt;

/// Submits scripts with `sbatch`.
///
/// The script's directory is used as working directory so relative paths and
/// the default output file land in the staging directory; the script is then
/// passed by file name.
pub struct SlurmSubmitter {
    config: SchedulerConfig,
}

impl SlurmSubmitter {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[async_trait]
impl Submitter for SlurmSubmitter {
    fn name(&self) -> &str {
        "slurm"
    }

    async fn submit(&self, script_path: &Path) -> Result<SubmissionReceipt, SubmitError> {
        if !script_path.is_file() {
            return Err(SubmitError::ScriptNotFound {
                path: script_path.to_path_buf(),
            });
        }

        let program = &self.config.submit_program;
        let mut command = Command::new(program);
        command.args(&self.config.extra_args).stdin(Stdio::null());

        let parent = script_path.parent().filter(|p| !p.as_os_str().is_empty());
        match (parent, script_path.file_name()) {
            (Some(dir), Some(name)) => {
                command.current_dir(dir).arg(name);
            }
            _ => {
                command.arg(script_path);
            }
        }

        debug!(program = %program, script = %script_path.display(), "Submitting job");

        let output = command
            .output()
            .await
            .map_err(|source| SubmitError::LaunchFailed {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SubmitError::Rejected {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let job_id = parse_job_id(&stdout);
        info!(
            script = %script_path.display(),
            job_id = ?job_id,
            "Job accepted by scheduler"
        );

        Ok(SubmissionReceipt {
            script_path: script_path.to_path_buf(),
            job_id,
        })
    }
}

/// Job ID from `sbatch` output such as "Submitted batch job 11".
pub fn parse_job_id(output: &str) -> Option<u64> {
    let re = Regex::new(r"Submitted batch job (\d+)").ok()?;
    re.captures(output)?.get(1)?.as_str().parse().ok()
}
