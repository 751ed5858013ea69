//! Data availability checker.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::request::{RequestKind, WorkRequest};

use super::pattern::FilePattern;

const FORWARD_READ_GLOB: &str = "*R1*fastq*";
const REVERSE_READ_GLOB: &str = "*R2*fastq*";
const ASSEMBLY_GLOB: &str = "*.fasta";

/// Errors that prevent the check from running at all.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// Directory could not be listed.
    #[error("Failed to list {path}: {source}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Identifier produced an unusable file pattern.
    #[error("Invalid file pattern for {identifier}: {reason}")]
    Pattern { identifier: String, reason: String },
}

/// Configuration for the availability checker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Where assembled FASTA files are looked up.
    /// Defaults to the staging directory.
    #[serde(default)]
    pub assembled_search_dir: Option<PathBuf>,
}

/// Identifiers whose data could not be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    /// Request kind the check was run for.
    pub kind: RequestKind,
    /// Missing identifiers, each listed once, in request order.
    pub missing: Vec<String>,
    /// Number of distinct identifiers checked.
    pub checked: usize,
}

impl AvailabilityReport {
    /// True when nothing is missing.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Number of distinct identifiers that were found.
    pub fn found_count(&self) -> usize {
        self.checked - self.missing.len()
    }
}

/// Checks retrieved data against a work request.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityChecker {
    config: AvailabilityConfig,
}

impl AvailabilityChecker {
    pub fn new(config: AvailabilityConfig) -> Self {
        Self { config }
    }

    /// Directory searched for the given request kind.
    pub fn search_dir<'a>(&'a self, kind: RequestKind, staging_dir: &'a Path) -> &'a Path {
        match kind {
            RequestKind::RawReads => staging_dir,
            RequestKind::AssembledSequences => self
                .config
                .assembled_search_dir
                .as_deref()
                .unwrap_or(staging_dir),
        }
    }

    /// Report which identifiers have no matching data files.
    ///
    /// Raw reads need both a forward and a reverse mate; either one missing
    /// flags the identifier. Assembled sequences need one FASTA file.
    pub async fn check(
        &self,
        request: &WorkRequest,
        staging_dir: &Path,
    ) -> Result<AvailabilityReport, AvailabilityError> {
        let dir = self.search_dir(request.kind, staging_dir);
        let names = list_file_names(dir).await?;

        let mut seen = HashSet::new();
        let mut missing = Vec::new();

        for id in &request.identifiers {
            if !seen.insert(id.as_str()) {
                continue;
            }

            let present = match request.kind {
                RequestKind::RawReads => {
                    has_match(&names, id, FORWARD_READ_GLOB)?
                        && has_match(&names, id, REVERSE_READ_GLOB)?
                }
                RequestKind::AssembledSequences => has_match(&names, id, ASSEMBLY_GLOB)?,
            };

            if !present {
                missing.push(id.clone());
            }
        }

        debug!(
            kind = %request.kind,
            dir = %dir.display(),
            checked = seen.len(),
            missing = missing.len(),
            "Availability check finished"
        );

        Ok(AvailabilityReport {
            kind: request.kind,
            missing,
            checked: seen.len(),
        })
    }
}

fn has_match(names: &[String], id: &str, glob: &str) -> Result<bool, AvailabilityError> {
    let pattern = FilePattern::new(id, glob).map_err(|e| AvailabilityError::Pattern {
        identifier: id.to_string(),
        reason: e.to_string(),
    })?;
    Ok(pattern.matches_any(names.iter().map(String::as_str)))
}

/// Names of the direct entries of a directory, sorted.
async fn list_file_names(dir: &Path) -> Result<Vec<String>, AvailabilityError> {
    let list_failed = |source| AvailabilityError::ListFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(list_failed)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(list_failed)? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
