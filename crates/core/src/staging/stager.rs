//! Job stager.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::request::WorkRequest;

use super::config::{fill_placeholders, JobConfig, StagingConfig};
use super::error::{StagingError, StagingFailure, StagingProgress};
use super::retriever::{RetrievalRequest, Retriever};
use super::template::{JobTemplate, SubmissionScript};
use super::types::{StagedRequest, SubmissionJob};

/// Prepares staging directories and submission scripts.
///
/// Staging is split in two halves around the availability check:
/// [`prepare`](Self::prepare) creates the directory, writes the manifest and
/// runs retrieval; [`build_job`](Self::build_job) renders the script and
/// copies the upload tooling.
pub struct JobStager {
    staging: StagingConfig,
    job: JobConfig,
    retriever: Arc<dyn Retriever>,
    fail_on_retrieval_error: bool,
}

impl JobStager {
    pub fn new(staging: StagingConfig, job: JobConfig, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            staging,
            job,
            retriever,
            fail_on_retrieval_error: false,
        }
    }

    /// Fail the ticket when a retrieval tool exits non-zero.
    pub fn with_strict_retrieval(mut self, strict: bool) -> Self {
        self.fail_on_retrieval_error = strict;
        self
    }

    pub fn staging_dir(&self, ticket_id: u64) -> PathBuf {
        self.staging.root.join(ticket_id.to_string())
    }

    pub fn job_name(&self, ticket_id: u64) -> String {
        format!("{}{}", self.job.job_name_prefix, ticket_id)
    }

    /// Create the staging directory, write the manifest and retrieve data.
    ///
    /// Fails without touching anything if the directory already exists.
    /// A relative staging root is resolved against the working directory,
    /// so every path handed to the tools and written to the script is
    /// absolute.
    pub async fn prepare(
        &self,
        ticket_id: u64,
        request: &WorkRequest,
    ) -> Result<StagedRequest, StagingFailure> {
        let mut progress = StagingProgress::default();
        let configured_dir = self.staging_dir(ticket_id);
        let staging_dir = std::path::absolute(&configured_dir).map_err(|source| {
            StagingFailure::new(
                configured_dir.clone(),
                progress,
                StagingError::CreateDirFailed {
                    path: configured_dir.clone(),
                    source,
                },
            )
        })?;
        let fail = |progress: StagingProgress, error| {
            StagingFailure::new(staging_dir.clone(), progress, error)
        };

        create_staging_dir(&self.staging.root, &staging_dir)
            .await
            .map_err(|e| fail(progress, e))?;
        progress.directory_created = true;

        let manifest_path = staging_dir.join(&self.staging.manifest_name);
        fs::write(&manifest_path, request.manifest())
            .await
            .map_err(|source| {
                fail(
                    progress,
                    StagingError::WriteFailed {
                        path: manifest_path.clone(),
                        source,
                    },
                )
            })?;
        progress.manifest_written = true;

        debug!(
            ticket_id,
            identifiers = request.identifiers.len(),
            manifest = %manifest_path.display(),
            "Wrote manifest"
        );

        let retrieval_request = RetrievalRequest {
            ticket_id,
            kind: request.kind,
            manifest_path: manifest_path.clone(),
            staging_dir: staging_dir.clone(),
        };
        let retrieval = self
            .retriever
            .retrieve(&retrieval_request)
            .await
            .map_err(|e| fail(progress, e))?;
        progress.retrieval_ran = true;

        if !retrieval.success() {
            if self.fail_on_retrieval_error {
                return Err(fail(
                    progress,
                    StagingError::RetrievalFailed {
                        program: retrieval.program.clone(),
                        exit_code: retrieval.exit_code,
                        stderr: retrieval.stderr_tail.clone(),
                    },
                ));
            }
            warn!(
                ticket_id,
                retriever = self.retriever.name(),
                program = %retrieval.program,
                exit_code = ?retrieval.exit_code,
                stderr = retrieval.stderr_tail.as_deref().unwrap_or(""),
                "Retrieval exited unsuccessfully, relying on availability check"
            );
        }

        Ok(StagedRequest {
            ticket_id,
            kind: request.kind,
            staging_dir,
            manifest_path,
            retrieval,
            progress,
        })
    }

    /// Render and write the submission script, then copy the upload tooling.
    pub async fn build_job(
        &self,
        staged: &mut StagedRequest,
    ) -> Result<SubmissionJob, StagingFailure> {
        let staging_dir = staged.staging_dir.clone();
        let fail = |progress: StagingProgress, error| {
            StagingFailure::new(staging_dir.clone(), progress, error)
        };

        let script = self
            .render_script(staged.ticket_id, &staging_dir)
            .await
            .map_err(|e| fail(staged.progress, e))?;
        let job_name = script
            .template
            .job_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.job_name(staged.ticket_id));

        let script_path = staging_dir.join(format!(
            "{}.{}",
            staged.ticket_id, self.staging.script_extension
        ));
        fs::write(&script_path, script.render())
            .await
            .map_err(|source| {
                fail(
                    staged.progress,
                    StagingError::WriteFailed {
                        path: script_path.clone(),
                        source,
                    },
                )
            })?;
        staged.progress.script_written = true;

        for path in &self.job.auxiliary_paths {
            copy_into(path, &staging_dir)
                .await
                .map_err(|e| fail(staged.progress, e))?;
        }
        staged.progress.tooling_copied = true;

        info!(
            ticket_id = staged.ticket_id,
            job_name = %job_name,
            script = %script_path.display(),
            "Staged submission script"
        );

        Ok(SubmissionJob {
            ticket_id: staged.ticket_id,
            job_name,
            script_path,
            script,
        })
    }

    async fn render_script(
        &self,
        ticket_id: u64,
        staging_dir: &Path,
    ) -> Result<SubmissionScript, StagingError> {
        let path = &self.job.template_path;
        let text = fs::read_to_string(path)
            .await
            .map_err(|source| StagingError::TemplateUnreadable {
                path: path.clone(),
                source,
            })?;

        let template = JobTemplate::parse(&text);
        if template.is_empty() {
            return Err(StagingError::TemplateInvalid {
                path: path.clone(),
                reason: "template is empty".to_string(),
            });
        }

        let template =
            template.with_job_name(&self.job.job_name_token, &self.job_name(ticket_id));
        let vars = [
            ("staging_dir", shell_quoted(staging_dir)),
            ("reference_db", shell_quoted(&self.job.reference_db)),
            ("clark_dir", shell_quoted(&self.job.clark_dir)),
            ("ticket_id", ticket_id.to_string()),
        ];

        let mut script = SubmissionScript::new(template);
        script.push(fill_placeholders(&self.job.pipeline_command, &vars));
        script.push(format!("cd {}", shell_quoted(staging_dir)));
        script.push(fill_placeholders(&self.job.upload_command, &vars));
        if !self.job.cleanup_patterns.is_empty() {
            script.push(format!("rm -rf {}", self.job.cleanup_patterns.join(" ")));
        }

        Ok(script)
    }
}

/// Path as a single shell word.
fn shell_quoted(path: &Path) -> String {
    shell_escape::escape(path.display().to_string().into()).into_owned()
}

/// Create `dir` under `root`, failing if `dir` is already there.
async fn create_staging_dir(root: &Path, dir: &Path) -> Result<(), StagingError> {
    fs::create_dir_all(root)
        .await
        .map_err(|source| StagingError::CreateDirFailed {
            path: root.to_path_buf(),
            source,
        })?;

    match fs::create_dir(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StagingError::DirectoryExists {
            path: dir.to_path_buf(),
        }),
        Err(source) => Err(StagingError::CreateDirFailed {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Copy a file or directory into `dest_dir`, keeping its name.
async fn copy_into(path: &Path, dest_dir: &Path) -> Result<(), StagingError> {
    let Some(name) = path.file_name() else {
        return Err(StagingError::CopyFailed {
            from: path.to_path_buf(),
            to: dest_dir.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"),
        });
    };
    copy_recursive(path, &dest_dir.join(name)).await
}

fn copy_recursive<'a>(
    from: &'a Path,
    to: &'a Path,
) -> Pin<Box<dyn Future<Output = Result<(), StagingError>> + Send + 'a>> {
    Box::pin(async move {
        let copy_failed = |source| StagingError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(from).await.map_err(copy_failed)?;
        if !metadata.is_dir() {
            fs::copy(from, to).await.map_err(copy_failed)?;
            return Ok(());
        }

        fs::create_dir_all(to).await.map_err(copy_failed)?;
        let mut entries = fs::read_dir(from).await.map_err(copy_failed)?;
        while let Some(entry) = entries.next_entry().await.map_err(copy_failed)? {
            let child_from = entry.path();
            let child_to = to.join(entry.file_name());
            copy_recursive(&child_from, &child_to).await?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestKind;
    use crate::testing::MockRetriever;

    use tempfile::TempDir;

    const TEMPLATE: &str = "#!/bin/bash\n#SBATCH -N 1\n#SBATCH --job-name=CLARK_JOB_NAME\nsource activate clark\n";

    struct Fixture {
        _temp: TempDir,
        root: PathBuf,
        tools: PathBuf,
        template: PathBuf,
    }

    async fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("requests");
        let tools = temp.path().join("tools");
        fs::create_dir_all(tools.join("RedmineAPI")).await.unwrap();
        fs::write(tools.join("upload_file.py"), "print('upload')\n")
            .await
            .unwrap();
        fs::write(tools.join("RedmineAPI").join("api.py"), "# api\n")
            .await
            .unwrap();
        let template = temp.path().join("CLARK.sh");
        fs::write(&template, TEMPLATE).await.unwrap();
        Fixture {
            _temp: temp,
            root,
            tools,
            template,
        }
    }

    fn stager(fx: &Fixture, retriever: Arc<dyn Retriever>) -> JobStager {
        JobStager::new(
            StagingConfig {
                root: fx.root.clone(),
                ..Default::default()
            },
            JobConfig {
                template_path: fx.template.clone(),
                reference_db: PathBuf::from("/db/bos_taurus"),
                clark_dir: PathBuf::from("/opt/clark"),
                auxiliary_paths: vec![
                    fx.tools.join("upload_file.py"),
                    fx.tools.join("RedmineAPI"),
                ],
                ..Default::default()
            },
            retriever,
        )
    }

    fn request(ids: &[&str]) -> WorkRequest {
        WorkRequest {
            identifiers: ids.iter().map(|s| s.to_string()).collect(),
            kind: RequestKind::RawReads,
        }
    }

    #[tokio::test]
    async fn test_prepare_writes_manifest_and_retrieves() {
        let fx = fixture().await;
        let retriever = Arc::new(MockRetriever::new());
        retriever.make_available(&["SEQ1"]).await;
        let stager = stager(&fx, retriever.clone());

        let staged = stager.prepare(42, &request(&["SEQ1", "SEQ2"])).await.unwrap();

        assert_eq!(staged.staging_dir, fx.root.join("42"));
        let manifest = fs::read_to_string(&staged.manifest_path).await.unwrap();
        assert_eq!(manifest, "SEQ1\nSEQ2\n");
        assert!(staged.staging_dir.join("SEQ1_R1_001.fastq.gz").exists());
        assert!(staged.progress.retrieval_ran);

        let calls = retriever.recorded_retrievals().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].ticket_id, 42);
    }

    #[tokio::test]
    async fn test_existing_directory_is_precondition_failure() {
        let fx = fixture().await;
        fs::create_dir_all(fx.root.join("42")).await.unwrap();
        fs::write(fx.root.join("42").join("keep.txt"), "x").await.unwrap();
        let retriever = Arc::new(MockRetriever::new());
        let stager = stager(&fx, retriever.clone());

        let failure = stager.prepare(42, &request(&["SEQ1"])).await.unwrap_err();

        assert!(failure.error.is_precondition());
        assert_eq!(failure.progress, StagingProgress::default());
        assert!(!fx.root.join("42").join("seqid.txt").exists());
        assert!(retriever.recorded_retrievals().await.is_empty());
    }

    #[tokio::test]
    async fn test_nonzero_retrieval_is_tolerated_by_default() {
        let fx = fixture().await;
        let retriever = Arc::new(MockRetriever::new().with_exit_code(1));
        let stager = stager(&fx, retriever);

        let staged = stager.prepare(5, &request(&["SEQ1"])).await.unwrap();
        assert_eq!(staged.retrieval.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_nonzero_retrieval_fails_when_strict() {
        let fx = fixture().await;
        let retriever = Arc::new(MockRetriever::new().with_exit_code(1));
        let stager = stager(&fx, retriever).with_strict_retrieval(true);

        let failure = stager.prepare(5, &request(&["SEQ1"])).await.unwrap_err();
        assert_eq!(failure.error.category(), "retrieval");
        assert!(failure.progress.manifest_written);
        assert!(failure.progress.retrieval_ran);
        assert!(fx.root.join("5").join("seqid.txt").exists());
    }

    #[tokio::test]
    async fn test_build_job_renders_script_and_copies_tooling() {
        let fx = fixture().await;
        let stager = stager(&fx, Arc::new(MockRetriever::new()));

        let mut staged = stager.prepare(42, &request(&["SEQ1"])).await.unwrap();
        let job = stager.build_job(&mut staged).await.unwrap();

        assert_eq!(job.job_name, "clark_42");
        assert_eq!(job.script_path, fx.root.join("42").join("42.sh"));

        let dir = fx.root.join("42");
        let text = fs::read_to_string(&job.script_path).await.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "#!/bin/bash");
        assert_eq!(lines[1], "#SBATCH -N 1");
        assert_eq!(lines[2], "#SBATCH --job-name=clark_42");
        assert_eq!(lines[3], "source activate clark");
        assert_eq!(
            lines[4],
            format!(
                "python -m metagenomefilter.automateCLARK -s {0} -d /db/bos_taurus -C /opt/clark {0}",
                dir.display()
            )
        );
        assert_eq!(lines[5], format!("cd {}", dir.display()));
        assert_eq!(lines[6], "python upload_file.py 42");
        assert_eq!(lines[7], "rm -rf *.fastq* */*fastq* RedmineAPI running_logs *json");
        assert!(!text.contains("CLARK_JOB_NAME"));

        assert!(dir.join("upload_file.py").exists());
        assert!(dir.join("RedmineAPI").join("api.py").exists());
        assert!(staged.progress.script_written);
        assert!(staged.progress.tooling_copied);
    }

    #[tokio::test]
    async fn test_missing_template_is_template_failure() {
        let fx = fixture().await;
        fs::remove_file(&fx.template).await.unwrap();
        let stager = stager(&fx, Arc::new(MockRetriever::new()));

        let mut staged = stager.prepare(3, &request(&["SEQ1"])).await.unwrap();
        let failure = stager.build_job(&mut staged).await.unwrap_err();

        assert_eq!(failure.error.category(), "template");
        assert!(!failure.progress.script_written);
        assert!(!fx.root.join("3").join("3.sh").exists());
    }

    #[tokio::test]
    async fn test_empty_template_is_rejected() {
        let fx = fixture().await;
        fs::write(&fx.template, "").await.unwrap();
        let stager = stager(&fx, Arc::new(MockRetriever::new()));

        let mut staged = stager.prepare(3, &request(&["SEQ1"])).await.unwrap();
        let failure = stager.build_job(&mut staged).await.unwrap_err();

        assert!(matches!(
            failure.error,
            StagingError::TemplateInvalid { .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_tooling_is_copy_failure() {
        let fx = fixture().await;
        fs::remove_file(fx.tools.join("upload_file.py")).await.unwrap();
        let stager = stager(&fx, Arc::new(MockRetriever::new()));

        let mut staged = stager.prepare(8, &request(&["SEQ1"])).await.unwrap();
        let failure = stager.build_job(&mut staged).await.unwrap_err();

        assert!(matches!(failure.error, StagingError::CopyFailed { .. }));
        assert!(failure.progress.script_written);
        assert!(!failure.progress.tooling_copied);
    }

    #[tokio::test]
    async fn test_relative_root_yields_absolute_paths() {
        let mut fx = fixture().await;
        let local = tempfile::Builder::new()
            .prefix(".autoclark-stager-")
            .tempdir_in(".")
            .unwrap();
        let cwd = std::env::current_dir().unwrap();
        fx.root = local.path().strip_prefix(&cwd).unwrap().join("requests");
        assert!(fx.root.is_relative());
        let retriever = Arc::new(MockRetriever::new());
        let stager = stager(&fx, retriever.clone());

        let mut staged = stager.prepare(42, &request(&["SEQ1"])).await.unwrap();
        assert!(staged.staging_dir.is_absolute());
        assert!(staged.staging_dir.ends_with("requests/42"));
        assert!(staged.manifest_path.is_absolute());

        let calls = retriever.recorded_retrievals().await;
        assert!(calls[0].staging_dir.is_absolute());
        assert!(calls[0].manifest_path.is_absolute());

        let job = stager.build_job(&mut staged).await.unwrap();
        assert!(job.script_path.is_absolute());
        assert!(job.script_path.is_file());
        let text = fs::read_to_string(&job.script_path).await.unwrap();
        assert!(text.contains(&format!("cd {}\n", staged.staging_dir.display())));
    }

    #[tokio::test]
    async fn test_paths_with_spaces_are_quoted_in_script() {
        let mut fx = fixture().await;
        fx.root = fx._temp.path().join("bio requests");
        let stager = stager(&fx, Arc::new(MockRetriever::new()));

        let mut staged = stager.prepare(42, &request(&["SEQ1"])).await.unwrap();
        let job = stager.build_job(&mut staged).await.unwrap();

        let dir = fx.root.join("42");
        let text = fs::read_to_string(&job.script_path).await.unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[4],
            format!(
                "python -m metagenomefilter.automateCLARK -s '{0}' -d /db/bos_taurus -C /opt/clark '{0}'",
                dir.display()
            )
        );
        assert_eq!(lines[5], format!("cd '{}'", dir.display()));
    }

    #[tokio::test]
    async fn test_hard_coded_job_name_is_replaced() {
        let fx = fixture().await;
        fs::write(&fx.template, "#!/bin/bash\n#SBATCH -J fixed\nrun\n")
            .await
            .unwrap();
        let stager = stager(&fx, Arc::new(MockRetriever::new()));

        let mut staged = stager.prepare(6, &request(&["SEQ1"])).await.unwrap();
        let job = stager.build_job(&mut staged).await.unwrap();

        assert_eq!(job.job_name, "clark_6");
        let text = fs::read_to_string(&job.script_path).await.unwrap();
        assert!(text.contains("#SBATCH -J fixed\n#SBATCH --job-name=clark_6\n"));
    }

    #[tokio::test]
    async fn test_distinct_tickets_do_not_collide() {
        let fx = fixture().await;
        let stager = stager(&fx, Arc::new(MockRetriever::new()));

        let mut a = stager.prepare(1, &request(&["A"])).await.unwrap();
        let mut b = stager.prepare(2, &request(&["B"])).await.unwrap();
        let job_a = stager.build_job(&mut a).await.unwrap();
        let job_b = stager.build_job(&mut b).await.unwrap();

        assert_ne!(job_a.script_path, job_b.script_path);
        assert_ne!(job_a.job_name, job_b.job_name);
    }
}
