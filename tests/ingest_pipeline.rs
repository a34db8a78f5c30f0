//! Ingest Pipeline Integration Tests
//!
//! Drives full sessions (queue reset -> loop -> close) through the public API
//! with the in-memory broker. Pacing is zero unless a test needs a pause to
//! observe cancellation.

use cellstream::broker::{MemoryBroker, MemoryBrokerHandle};
use cellstream::config::IngestPolicy;
use cellstream::pipeline::{
    run_session, CsvRecordSource, IngestError, IngestLoop, IngestOutcome, IngestReport,
    RecordHooks, ReplaySource, SourceError,
};
use cellstream::types::{AlertEvent, AlertKind, SensorRecord};
use std::io::Cursor;
use std::time::Duration;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use cellstream::types::AlertKind::{CO2High, CellDensityDiscard, CellDensityReady, O2Low};

/// Per-record trace captured through the loop hooks.
#[derive(Default)]
struct Trace {
    rows: Vec<(SensorRecord, bool, Vec<AlertKind>)>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl Trace {
    fn cancelling_after(n: usize, token: CancellationToken) -> Self {
        Self {
            rows: Vec::new(),
            cancel_after: Some((n, token)),
        }
    }
}

impl RecordHooks for &mut Trace {
    fn on_record(&mut self, record: &SensorRecord, published: bool, alerts: &[AlertEvent]) {
        self.rows
            .push((*record, published, alerts.iter().map(|a| a.kind).collect()));
        if let Some((n, ref token)) = self.cancel_after {
            if self.rows.len() >= n {
                token.cancel();
            }
        }
    }
}

fn policy() -> IngestPolicy {
    IngestPolicy::default().with_pacing(Duration::ZERO)
}

fn csv_source(text: &str) -> CsvRecordSource<BufReader<Cursor<Vec<u8>>>> {
    CsvRecordSource::from_reader(
        BufReader::new(Cursor::new(text.as_bytes().to_vec())),
        "Cell_Data.csv",
    )
}

async fn run_records(records: Vec<SensorRecord>, trace: &mut Trace) -> (IngestReport, MemoryBrokerHandle) {
    let mut broker = MemoryBroker::new();
    let handle = broker.handle();
    let mut source = ReplaySource::new(records);
    let report = run_session(&mut broker, &mut source, policy(), trace, CancellationToken::new()).await;
    (report, handle)
}

#[tokio::test]
async fn end_to_end_duplicate_timestamp_scenario() {
    let mut trace = Trace::default();
    let mut broker = MemoryBroker::new();
    let handle = broker.handle();
    let mut source = csv_source(
        "Timestamp,Cell Density,O2 Levels,CO2 Levels\n\
         1.0,1.0,40,10\n\
         1.0,1.0,40,10\n\
         2.0,2.0,39,18\n",
    );

    let report = run_session(
        &mut broker,
        &mut source,
        policy(),
        &mut trace,
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(report.outcome, IngestOutcome::Completed));
    assert_eq!(
        handle.published(),
        vec![
            ("Cell_Data".to_string(), "1.0,1.0,40.0,10.0".to_string()),
            ("Cell_Data".to_string(), "2.0,2.0,39.0,18.0".to_string()),
        ]
    );

    let published: Vec<bool> = trace.rows.iter().map(|r| r.1).collect();
    assert_eq!(published, vec![true, false, true]);
    let alerts: Vec<Vec<AlertKind>> = trace.rows.iter().map(|r| r.2.clone()).collect();
    assert_eq!(alerts, vec![vec![], vec![], vec![CellDensityReady, CO2High]]);

    assert_eq!(report.stats.records_read, 3);
    assert_eq!(report.stats.records_published, 2);
    assert_eq!(report.stats.records_deduplicated, 1);
    assert_eq!(report.stats.total_alerts(), 2);
    assert!(report.stats.finished_at.is_some());
}

#[tokio::test]
async fn session_resets_queues_and_closes_once() {
    let mut trace = Trace::default();
    let (report, handle) = run_records(vec![SensorRecord::new(1.0, 1.0, 40.0, 10.0)], &mut trace).await;

    assert!(report.outcome.is_success());
    let log = handle.snapshot();
    assert_eq!(log.queues, vec!["cell-density", "o2-levels", "co2-levels"]);
    // Nothing is ever routed to the provisioned queues themselves.
    assert!(log.published.iter().all(|(ch, _)| !log.queues.contains(ch)));
    assert_eq!(log.closes, 1);
}

#[tokio::test]
async fn alerts_fire_on_deduplicated_records() {
    let mut trace = Trace::default();
    let (report, handle) = run_records(
        vec![
            SensorRecord::new(5.0, 1.0, 40.0, 10.0),
            SensorRecord::new(5.0, 1.0, 40.0, 20.0),
        ],
        &mut trace,
    )
    .await;

    assert_eq!(handle.published().len(), 1);
    assert!(!trace.rows[1].1);
    assert_eq!(trace.rows[1].2, vec![CO2High]);
    assert_eq!(report.stats.alert_count(CO2High), 1);
}

#[tokio::test]
async fn consecutive_equal_timestamps_publish_once() {
    let mut trace = Trace::default();
    let records = vec![
        SensorRecord::new(1.0, 1.0, 40.0, 10.0),
        SensorRecord::new(1.0, 1.2, 39.0, 11.0),
        SensorRecord::new(1.0, 1.3, 39.5, 12.0),
        SensorRecord::new(2.0, 1.4, 39.5, 12.0),
        SensorRecord::new(1.0, 1.5, 39.5, 12.0),
    ];
    let (_, handle) = run_records(records, &mut trace).await;

    let stamps: Vec<String> = handle
        .published()
        .into_iter()
        .map(|(_, m)| m.split(',').next().unwrap_or_default().to_string())
        .collect();
    // A timestamp that returns after a different one is published again.
    assert_eq!(stamps, vec!["1.0", "2.0", "1.0"]);
}

#[tokio::test]
async fn density_latch_across_loop() {
    let mut trace = Trace::default();
    let records = [2.0, 1.8, 1.5, 1.4]
        .iter()
        .enumerate()
        .map(|(i, &d)| SensorRecord::new(i as f64, d, 40.0, 10.0))
        .collect();
    let (report, _) = run_records(records, &mut trace).await;

    let alerts: Vec<Vec<AlertKind>> = trace.rows.iter().map(|r| r.2.clone()).collect();
    assert_eq!(
        alerts,
        vec![vec![CellDensityReady], vec![], vec![CellDensityDiscard], vec![]]
    );
    assert_eq!(report.stats.alert_count(CellDensityDiscard), 1);
}

#[tokio::test]
async fn malformed_row_stops_run() {
    let mut trace = Trace::default();
    let mut broker = MemoryBroker::new();
    let handle = broker.handle();
    let mut source = csv_source("h\n1.0,1.0,40,10\n2.0,1.0\n3.0,1.0,37,10\n");

    let report = run_session(
        &mut broker,
        &mut source,
        policy(),
        &mut trace,
        CancellationToken::new(),
    )
    .await;

    match &report.outcome {
        IngestOutcome::Failed(IngestError::Source(SourceError::Malformed(err))) => {
            assert_eq!(err.line, 3);
        }
        other => panic!("expected malformed-record failure, got {other:?}"),
    }
    assert_eq!(handle.published().len(), 1);
    assert_eq!(trace.rows.len(), 1);
    assert!(!report.outcome.is_success());
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn publish_failure_is_fatal() {
    let mut trace = Trace::default();
    let mut broker = MemoryBroker::new().failing_publish_at(2);
    let handle = broker.handle();
    let mut source = ReplaySource::new(vec![
        SensorRecord::new(1.0, 1.0, 40.0, 10.0),
        SensorRecord::new(2.0, 1.0, 30.0, 10.0),
        SensorRecord::new(3.0, 1.0, 40.0, 10.0),
    ]);

    let report = run_session(
        &mut broker,
        &mut source,
        policy(),
        &mut trace,
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        report.outcome,
        IngestOutcome::Failed(IngestError::Publish(_))
    ));
    // The failing record is neither counted nor evaluated.
    assert_eq!(report.stats.records_published, 1);
    assert_eq!(report.stats.alert_count(O2Low), 0);
    assert_eq!(trace.rows.len(), 1);
    assert_eq!(handle.close_count(), 1);
}

#[tokio::test]
async fn interrupt_mid_run_closes_broker_once() {
    let token = CancellationToken::new();
    let mut trace = Trace::cancelling_after(2, token.clone());
    let mut broker = MemoryBroker::new();
    let handle = broker.handle();
    let records = (0..10)
        .map(|i| SensorRecord::new(f64::from(i), 1.0, 40.0, 10.0))
        .collect();
    let mut source = ReplaySource::new(records);

    let report = run_session(
        &mut broker,
        &mut source,
        IngestPolicy::default().with_pacing(Duration::from_millis(5)),
        &mut trace,
        token,
    )
    .await;

    assert!(matches!(report.outcome, IngestOutcome::Cancelled));
    assert!(report.outcome.is_success());
    assert_eq!(handle.published().len(), 2);
    assert_eq!(handle.close_count(), 1);
    assert!(handle.is_closed());
}

#[tokio::test]
async fn cancelled_before_start_reads_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let mut broker = MemoryBroker::new();
    let handle = broker.handle();
    let mut source = ReplaySource::new(vec![SensorRecord::new(1.0, 1.0, 40.0, 10.0)]);

    let report = run_session(&mut broker, &mut source, policy(), (), token).await;

    assert!(matches!(report.outcome, IngestOutcome::Cancelled));
    assert_eq!(report.stats.records_read, 0);
    let log = handle.snapshot();
    // Queues are left alone once the user has interrupted.
    assert!(log.queues.is_empty());
    assert_eq!(log.deletes, 0);
    assert!(log.published.is_empty());
    assert_eq!(log.closes, 1);
}

#[tokio::test(start_paused = true)]
async fn pacing_delays_each_record() {
    let mut broker = MemoryBroker::new();
    let mut source = ReplaySource::new(vec![
        SensorRecord::new(1.0, 1.0, 40.0, 10.0),
        SensorRecord::new(2.0, 1.0, 40.0, 10.0),
        SensorRecord::new(3.0, 1.0, 40.0, 10.0),
    ]);

    let start = tokio::time::Instant::now();
    let report = IngestLoop::new(
        IngestPolicy::default().with_pacing(Duration::from_secs(1)),
        CancellationToken::new(),
    )
    .run(&mut source, &mut broker)
    .await;

    assert!(matches!(report.outcome, IngestOutcome::Completed));
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}
