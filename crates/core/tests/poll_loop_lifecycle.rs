//! Poll loop lifecycle integration tests.
//!
//! These tests verify the running state management of the poll loop:
//! - First poll happens immediately
//! - Stop signal ends the loop during the sleep
//! - A second concurrent run is refused

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use autoclark_core::{
    AvailabilityChecker, JobStager, PollLoop, PollerConfig, SqliteSeenLedger, TicketProcessor,
    request::RequestConfig,
    staging::{JobConfig, StagingConfig},
    testing::{fixtures, MockRetriever, MockSubmitter, MockTracker},
    tracker::TicketStatus,
};

fn build_loop(temp_dir: &TempDir, tracker: Arc<MockTracker>) -> Arc<PollLoop> {
    let template = temp_dir.path().join("CLARK.sh");
    std::fs::write(&template, fixtures::JOB_TEMPLATE).expect("Failed to write template");

    let stager = JobStager::new(
        StagingConfig {
            root: temp_dir.path().join("requests"),
            ..Default::default()
        },
        JobConfig {
            template_path: template,
            auxiliary_paths: vec![],
            ..Default::default()
        },
        Arc::new(MockRetriever::new()),
    );
    let processor = TicketProcessor::new(
        RequestConfig::default(),
        stager,
        AvailabilityChecker::default(),
        Arc::new(MockSubmitter::new()),
    );

    Arc::new(PollLoop::new(
        PollerConfig {
            interval_secs: 3600,
            ..Default::default()
        },
        tracker,
        Arc::new(SqliteSeenLedger::in_memory().expect("Failed to open ledger")),
        Arc::new(processor),
    ))
}

async fn wait_for_status(tracker: &MockTracker, ticket_id: u64, status: TicketStatus) {
    for _ in 0..200 {
        if tracker.status_of(ticket_id).await == Some(status) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("ticket {} never reached {}", ticket_id, status);
}

#[tokio::test]
async fn test_run_polls_immediately_and_stops() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = Arc::new(MockTracker::new());
    tracker.add_ticket(fixtures::ticket(1, "SEQID001")).await;
    let poll_loop = build_loop(&temp_dir, tracker.clone());

    let runner = Arc::clone(&poll_loop);
    let handle = tokio::spawn(async move { runner.run().await });

    wait_for_status(&tracker, 1, TicketStatus::AwaitingJobResult).await;
    assert!(poll_loop.is_running());

    poll_loop.stop();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Poll loop did not stop")
        .expect("Poll loop task panicked");

    assert!(!poll_loop.is_running());
}

#[tokio::test]
async fn test_second_run_is_refused() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let tracker = Arc::new(MockTracker::new());
    tracker.add_ticket(fixtures::ticket(2, "SEQID001")).await;
    let poll_loop = build_loop(&temp_dir, tracker.clone());

    let runner = Arc::clone(&poll_loop);
    let handle = tokio::spawn(async move { runner.run().await });
    wait_for_status(&tracker, 2, TicketStatus::AwaitingJobResult).await;

    // Returns at once because the loop is already running.
    tokio::time::timeout(Duration::from_secs(1), poll_loop.run())
        .await
        .expect("Second run should return immediately");
    assert!(poll_loop.is_running());

    poll_loop.stop();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Poll loop did not stop")
        .expect("Poll loop task panicked");
}

#[tokio::test]
async fn test_stop_without_run_is_harmless() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let poll_loop = build_loop(&temp_dir, Arc::new(MockTracker::new()));

    poll_loop.stop();
    assert!(!poll_loop.is_running());
}
