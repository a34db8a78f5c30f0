//! Ingest Pipeline Module
//!
//! ```text
//! RecordSource ──► Dedup Gate ──► Publisher (accepted records only)
//!                       │
//!                       └──────► Alert Evaluator (every record) ──► log sink
//! ```
//!
//! Single task, one record at a time, fixed pacing between records.

mod state;
pub mod alerts;
pub mod dedup;
pub mod outcome;
pub mod processing_loop;
pub mod session;
pub mod source;

pub use alerts::{AlertEvaluator, Evaluation};
pub use outcome::{IngestError, IngestOutcome, IngestReport, RunStats};
pub use processing_loop::{IngestLoop, RecordHooks};
pub use session::run_session;
pub use source::{CsvRecordSource, RecordEvent, RecordSource, ReplaySource, SourceError};
pub use state::*;
