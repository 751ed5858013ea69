//! Configuration for staging, retrieval and job scripts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how staging directories are laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Parent of all per-ticket staging directories.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File name of the SEQID manifest.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Extension of the generated submission script.
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
}

fn default_root() -> PathBuf {
    PathBuf::from("/mnt/nas/bio_requests")
}

fn default_manifest_name() -> String {
    "seqid.txt".to_string()
}

fn default_script_extension() -> String {
    "sh".to_string()
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            manifest_name: default_manifest_name(),
            script_extension: default_script_extension(),
        }
    }
}

/// An external command line.
///
/// Arguments may contain `{manifest}`, `{staging_dir}` and `{search_root}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Directory the command runs in; inherits ours when unset.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Arguments with placeholders substituted.
    pub fn render_args(&self, vars: &[(&str, String)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| fill_placeholders(arg, vars))
            .collect()
    }
}

/// Configuration of the data retrieval tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Links paired-end reads for the manifest into the staging directory.
    #[serde(default = "default_raw_reads")]
    pub raw_reads: CommandSpec,

    /// Extracts assembled sequences for the manifest into the staging directory.
    #[serde(default = "default_assembled")]
    pub assembled: CommandSpec,

    /// Root the sequence extractor searches for assemblies.
    #[serde(default = "default_search_root")]
    pub search_root: PathBuf,

    /// Treat a non-zero exit of a retrieval tool as a failed request.
    /// When false the exit is only logged and the presence check decides.
    #[serde(default)]
    pub fail_on_nonzero_exit: bool,
}

fn default_raw_reads() -> CommandSpec {
    CommandSpec {
        program: "python2".to_string(),
        args: vec![
            "/mnt/nas/MiSeq_Backup/file_linker.py".to_string(),
            "{manifest}".to_string(),
            "{staging_dir}".to_string(),
        ],
        working_dir: Some(PathBuf::from("/mnt/nas/MiSeq_Backup")),
    }
}

fn default_assembled() -> CommandSpec {
    CommandSpec {
        program: "python2".to_string(),
        args: vec![
            "/mnt/nas/External_MiSeq_Backup/file_extractor.py".to_string(),
            "{manifest}".to_string(),
            "{staging_dir}".to_string(),
        ],
        working_dir: Some(PathBuf::from("/mnt/nas/External_MiSeq_Backup")),
    }
}

fn default_search_root() -> PathBuf {
    PathBuf::from("/mnt/nas/External_MiSeq_Backup")
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            raw_reads: default_raw_reads(),
            assembled: default_assembled(),
            search_root: default_search_root(),
            fail_on_nonzero_exit: false,
        }
    }
}

/// Configuration of the generated submission script.
///
/// `pipeline_command` and `upload_command` may use `{staging_dir}`,
/// `{reference_db}`, `{clark_dir}` and `{ticket_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Scheduler script template (shebang, `#SBATCH` directives, body).
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// Token in the template replaced by the job name.
    #[serde(default = "default_job_name_token")]
    pub job_name_token: String,

    /// Job names are this prefix followed by the ticket ID.
    #[serde(default = "default_job_name_prefix")]
    pub job_name_prefix: String,

    #[serde(default = "default_pipeline_command")]
    pub pipeline_command: String,

    /// Reference database the classifier runs against.
    #[serde(default = "default_reference_db")]
    pub reference_db: PathBuf,

    /// CLARK installation directory.
    #[serde(default = "default_clark_dir")]
    pub clark_dir: PathBuf,

    /// Uploads the generated report back to the ticket.
    #[serde(default = "default_upload_command")]
    pub upload_command: String,

    /// Removed at the end of the job. Reports are not listed here.
    #[serde(default = "default_cleanup_patterns")]
    pub cleanup_patterns: Vec<String>,

    /// Files or directories copied into every staging directory.
    #[serde(default = "default_auxiliary_paths")]
    pub auxiliary_paths: Vec<PathBuf>,
}

fn default_template_path() -> PathBuf {
    PathBuf::from("CLARK.sh")
}

fn default_job_name_token() -> String {
    "CLARK_JOB_NAME".to_string()
}

fn default_job_name_prefix() -> String {
    "clark_".to_string()
}

fn default_pipeline_command() -> String {
    "python -m metagenomefilter.automateCLARK -s {staging_dir} -d {reference_db} -C {clark_dir} {staging_dir}"
        .to_string()
}

fn default_reference_db() -> PathBuf {
    PathBuf::from("/mnt/nas/Adam/RefseqDatabase/Bos_taurus/")
}

fn default_clark_dir() -> PathBuf {
    PathBuf::from("/home/ubuntu/Programs/CLARKSCV1.2.3.2/")
}

fn default_upload_command() -> String {
    "python upload_file.py {ticket_id}".to_string()
}

fn default_cleanup_patterns() -> Vec<String> {
    ["*.fastq*", "*/*fastq*", "RedmineAPI", "running_logs", "*json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_auxiliary_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("upload_file.py"), PathBuf::from("RedmineAPI")]
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            job_name_token: default_job_name_token(),
            job_name_prefix: default_job_name_prefix(),
            pipeline_command: default_pipeline_command(),
            reference_db: default_reference_db(),
            clark_dir: default_clark_dir(),
            upload_command: default_upload_command(),
            cleanup_patterns: default_cleanup_patterns(),
            auxiliary_paths: default_auxiliary_paths(),
        }
    }
}

/// Replace every `{name}` in `template` with its value.
pub fn fill_placeholders(template: &str, vars: &[(&str, String)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}
