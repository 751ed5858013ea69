//! Retrieval of sequence data into a staging directory.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::request::RequestKind;

use super::config::{CommandSpec, RetrievalConfig};
use super::error::StagingError;

/// Lines of stderr kept for diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// What to retrieve and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub ticket_id: u64,
    pub kind: RequestKind,
    pub manifest_path: PathBuf,
    pub staging_dir: PathBuf,
}

/// How a retrieval tool finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalOutcome {
    /// Program that ran.
    pub program: String,
    /// Exit code; `None` when killed by a signal.
    pub exit_code: Option<i32>,
    /// Last lines of stderr, if any.
    pub stderr_tail: Option<String>,
}

impl RetrievalOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Populates a staging directory with the data named in a manifest.
///
/// Implementations only report how the tool finished; whether a non-zero
/// exit fails the request is up to the caller.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Returns the name of this retriever implementation.
    fn name(&self) -> &str;

    /// Runs the retrieval for the request kind.
    async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalOutcome, StagingError>;
}

/// Retriever that runs the configured external tools.
pub struct CommandRetriever {
    config: RetrievalConfig,
}

impl CommandRetriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    fn command_for(&self, kind: RequestKind) -> &CommandSpec {
        match kind {
            RequestKind::RawReads => &self.config.raw_reads,
            RequestKind::AssembledSequences => &self.config.assembled,
        }
    }

    fn args_for(&self, request: &RetrievalRequest) -> Vec<String> {
        let vars = [
            ("manifest", request.manifest_path.display().to_string()),
            ("staging_dir", request.staging_dir.display().to_string()),
            ("search_root", self.config.search_root.display().to_string()),
        ];
        self.command_for(request.kind).render_args(&vars)
    }
}

#[async_trait]
impl Retriever for CommandRetriever {
    fn name(&self) -> &str {
        "command"
    }

    async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalOutcome, StagingError> {
        let spec = self.command_for(request.kind);
        let args = self.args_for(request);

        debug!(
            ticket_id = request.ticket_id,
            kind = %request.kind,
            program = %spec.program,
            ?args,
            "Running retrieval command"
        );

        let mut command = Command::new(&spec.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|source| StagingError::RetrievalLaunchFailed {
                program: spec.program.clone(),
                source,
            })?;

        Ok(RetrievalOutcome {
            program: spec.program.clone(),
            exit_code: output.status.code(),
            stderr_tail: stderr_tail(&String::from_utf8_lossy(&output.stderr)),
        })
    }
}

/// Last few non-empty lines of a process's stderr.
pub(crate) fn stderr_tail(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    Some(lines[start..].join("\n"))
}
