//! Work request types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of data a request asks the pipeline to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Paired-end FASTQ reads (forward/reverse mates).
    #[default]
    RawReads,
    /// Assembled sequences, one FASTA file per SEQID.
    AssembledSequences,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::RawReads => "raw_reads",
            RequestKind::AssembledSequences => "assembled_sequences",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed request: which SEQIDs to process and how.
///
/// Identifiers keep their order and duplicates; consumers must tolerate both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkRequest {
    pub identifiers: Vec<String>,
    pub kind: RequestKind,
}

impl WorkRequest {
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Manifest contents: one identifier per line.
    pub fn manifest(&self) -> String {
        let mut out = String::new();
        for id in &self.identifiers {
            out.push_str(id);
            out.push('\n');
        }
        out
    }
}

/// Request parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Line that switches a request to assembled sequences.
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
}

fn default_sentinel() -> String {
    "FASTA".to_string()
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
        }
    }
}
