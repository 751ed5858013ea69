//! Ticket processor implementation.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::availability::AvailabilityChecker;
use crate::request::{parse_request, RequestConfig};
use crate::scheduler::Submitter;
use crate::staging::JobStager;
use crate::tracker::Ticket;

use super::types::{PipelineError, ProcessedTicket};

/// Runs the request pipeline for one ticket.
pub struct TicketProcessor {
    request_config: RequestConfig,
    stager: JobStager,
    checker: AvailabilityChecker,
    submitter: Arc<dyn Submitter>,
}

impl TicketProcessor {
    pub fn new(
        request_config: RequestConfig,
        stager: JobStager,
        checker: AvailabilityChecker,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        Self {
            request_config,
            stager,
            checker,
            submitter,
        }
    }

    /// Parse, stage, check, write the script and submit it.
    ///
    /// Missing data does not stop the pipeline; it is carried in the
    /// returned report.
    pub async fn process(&self, ticket: &Ticket) -> Result<ProcessedTicket, PipelineError> {
        let request = parse_request(&ticket.description, &self.request_config.sentinel);
        debug!(
            ticket_id = ticket.id,
            kind = %request.kind,
            identifiers = request.identifiers.len(),
            "Parsed request"
        );
        if request.is_empty() {
            warn!(ticket_id = ticket.id, "Request lists no identifiers");
        }

        let mut staged = self.stager.prepare(ticket.id, &request).await?;

        let report = self.checker.check(&request, &staged.staging_dir).await?;
        if !report.is_complete() {
            warn!(
                ticket_id = ticket.id,
                found = report.found_count(),
                missing = ?report.missing,
                "Some identifiers have no data"
            );
        }

        let job = self.stager.build_job(&mut staged).await?;
        let receipt = self.submitter.submit(&job.script_path).await?;

        info!(
            ticket_id = ticket.id,
            job_name = %job.job_name,
            scheduler = self.submitter.name(),
            job_id = ?receipt.job_id,
            "Job submitted"
        );

        Ok(ProcessedTicket {
            request,
            report,
            job,
            receipt,
        })
    }
}
