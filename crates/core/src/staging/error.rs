//! Error types for staging.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while staging a ticket.
#[derive(Debug, Error)]
pub enum StagingError {
    /// Staging directory is already there; another run owns this ticket.
    #[error("Staging directory already exists: {path}")]
    DirectoryExists { path: PathBuf },

    /// Staging directory could not be created.
    #[error("Failed to create staging directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file inside the staging directory could not be written.
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Retrieval tool could not be started.
    #[error("Failed to launch retrieval command '{program}': {source}")]
    RetrievalLaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Retrieval tool ran but reported failure.
    #[error("Retrieval command '{}' exited with {}{}", .program, exit_label(.exit_code), stderr_suffix(.stderr))]
    RetrievalFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    /// Job template could not be read.
    #[error("Failed to read job template {path}: {source}")]
    TemplateUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Job template is not usable.
    #[error("Invalid job template {path}: {reason}")]
    TemplateInvalid { path: PathBuf, reason: String },

    /// Auxiliary tooling could not be copied.
    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr {
        Some(text) if !text.trim().is_empty() => format!(": {}", text.trim()),
        _ => String::new(),
    }
}

impl StagingError {
    /// Failure category reported to the ticket author.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DirectoryExists { .. } => "precondition",
            Self::RetrievalLaunchFailed { .. } | Self::RetrievalFailed { .. } => "retrieval",
            Self::TemplateUnreadable { .. } | Self::TemplateInvalid { .. } => "template",
            Self::CreateDirFailed { .. } | Self::WriteFailed { .. } | Self::CopyFailed { .. } => {
                "staging"
            }
        }
    }

    /// Whether the ticket is already being handled by someone else.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::DirectoryExists { .. })
    }
}

/// Staging steps that completed before a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingProgress {
    pub directory_created: bool,
    pub manifest_written: bool,
    pub retrieval_ran: bool,
    pub script_written: bool,
    pub tooling_copied: bool,
}

impl StagingProgress {
    /// Names of the completed steps, in order.
    pub fn completed_steps(&self) -> Vec<&'static str> {
        [
            (self.directory_created, "directory"),
            (self.manifest_written, "manifest"),
            (self.retrieval_ran, "retrieval"),
            (self.script_written, "script"),
            (self.tooling_copied, "tooling"),
        ]
        .into_iter()
        .filter_map(|(done, name)| done.then_some(name))
        .collect()
    }
}

/// A staging error together with what was left on disk.
#[derive(Debug)]
pub struct StagingFailure {
    pub staging_dir: PathBuf,
    pub progress: StagingProgress,
    pub error: StagingError,
}

impl StagingFailure {
    pub fn new(staging_dir: PathBuf, progress: StagingProgress, error: StagingError) -> Self {
        Self {
            staging_dir,
            progress,
            error,
        }
    }
}

impl fmt::Display for StagingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        let steps = self.progress.completed_steps();
        if !steps.is_empty() {
            write!(
                f,
                " (left in {}: {})",
                self.staging_dir.display(),
                steps.join(", ")
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for StagingFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
