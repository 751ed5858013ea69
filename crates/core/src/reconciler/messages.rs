//! Notes written to tickets.

use crate::availability::AvailabilityReport;
use crate::request::RequestKind;

pub const SUBMITTED_MESSAGE: &str = "Your job has been submitted to the OLC Compute Cluster. \
     This issue will be updated with results once the job is complete.";

const FAILURE_MESSAGE: &str =
    "There was a problem with your request. Please create a new issue on Redmine to re-run it.";

pub fn in_progress_message(subject: &str) -> String {
    format!("Beginning the process for: {}", subject)
}

/// Note listing the identifiers whose data was not found.
pub fn missing_data_warning(report: &AvailabilityReport) -> String {
    let what = match report.kind {
        RequestKind::RawReads => "paired FASTQ files",
        RequestKind::AssembledSequences => "an assembled FASTA file",
    };
    format!(
        "Could not find {} for {} of {} requested SEQID(s); they will be skipped:\n{}",
        what,
        report.missing.len(),
        report.checked,
        report.missing.join("\n")
    )
}

/// Hand-off note, with a warning line when some data was missing.
pub fn submitted_message(missing: Option<&AvailabilityReport>) -> String {
    match missing {
        Some(report) if !report.is_complete() => format!(
            "{}\nWARNING: results will not include {}.",
            SUBMITTED_MESSAGE,
            report.missing.join(", ")
        ),
        _ => SUBMITTED_MESSAGE.to_string(),
    }
}

pub fn failure_message(reason: &str) -> String {
    format!("{}\n{}", FAILURE_MESSAGE, reason)
}
