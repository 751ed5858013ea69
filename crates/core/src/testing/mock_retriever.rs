//! Mock retriever for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::request::RequestKind;
use crate::staging::{RetrievalOutcome, RetrievalRequest, Retriever, StagingError};

/// Mock implementation of the Retriever trait.
///
/// Instead of running a tool it creates data files for the identifiers
/// marked available: both read mates for raw reads, a FASTA file for
/// assembled sequences. Requested identifiers not marked available get no
/// files, like a SEQID missing from the backups.
#[derive(Debug)]
pub struct MockRetriever {
    available: Arc<RwLock<HashSet<String>>>,
    retrievals: Arc<RwLock<Vec<RetrievalRequest>>>,
    next_error: Arc<RwLock<Option<StagingError>>>,
    exit_code: i32,
}

impl Default for MockRetriever {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRetriever {
    pub fn new() -> Self {
        Self {
            available: Arc::new(RwLock::new(HashSet::new())),
            retrievals: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            exit_code: 0,
        }
    }

    /// Report this exit code from every retrieval.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Mark identifiers as present in the backups.
    pub async fn make_available(&self, identifiers: &[&str]) {
        let mut available = self.available.write().await;
        for id in identifiers {
            available.insert(id.to_string());
        }
    }

    /// Get all recorded retrieval requests.
    pub async fn recorded_retrievals(&self) -> Vec<RetrievalRequest> {
        self.retrievals.read().await.clone()
    }

    /// Configure the next retrieval to fail with the given error.
    pub async fn set_next_error(&self, error: StagingError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    fn name(&self) -> &str {
        "mock"
    }

    async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalOutcome, StagingError> {
        self.retrievals.write().await.push(request.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        let manifest = fs::read_to_string(&request.manifest_path)
            .await
            .map_err(|source| StagingError::RetrievalLaunchFailed {
                program: "mock".to_string(),
                source,
            })?;

        let available = self.available.read().await;
        for id in manifest.lines().filter(|id| available.contains(*id)) {
            let names = match request.kind {
                RequestKind::RawReads => vec![
                    format!("{}_R1_001.fastq.gz", id),
                    format!("{}_R2_001.fastq.gz", id),
                ],
                RequestKind::AssembledSequences => vec![format!("{}.fasta", id)],
            };
            for name in names {
                let path = request.staging_dir.join(name);
                fs::write(&path, b"")
                    .await
                    .map_err(|source| StagingError::WriteFailed {
                        path: path.clone(),
                        source,
                    })?;
            }
        }

        Ok(RetrievalOutcome {
            program: "mock".to_string(),
            exit_code: Some(self.exit_code),
            stderr_tail: (self.exit_code != 0).then(|| "mock retrieval failed".to_string()),
        })
    }
}
