//! Record source abstraction for sensor log ingestion.
//!
//! Provides a unified trait for reading sensor records from different
//! sources: a CSV file read lazily line by line, or records already in
//! memory (replay).

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::acquisition::{parse_row, MalformedRecord};
use crate::types::SensorRecord;

/// Events produced by a record source.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    /// A valid record was read.
    Record(SensorRecord),
    /// Source reached end of data.
    Eof,
}

/// Unrecoverable source failures. Both end the run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),

    #[error("Failed to read sensor log: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait abstracting where sensor records come from.
///
/// Sources are forward-only and finite. The ingest loop calls
/// [`next_record`](RecordSource::next_record) in a `select!` with cancellation.
#[async_trait]
pub trait RecordSource: Send {
    /// Read the next record; `RecordEvent::Eof` once exhausted.
    async fn next_record(&mut self) -> Result<RecordEvent, SourceError>;

    /// Human-readable name for logging (e.g. the file path).
    fn source_name(&self) -> &str;
}

// ============================================================================
// CSV Source (lazy file reader)
// ============================================================================

/// Reads records from a CSV sensor log, one line at a time.
///
/// The first line is always skipped as a header. Line numbers reported in
/// errors are 1-based and count the header.
pub struct CsvRecordSource<R> {
    lines: Lines<R>,
    name: String,
    line_number: usize,
    header_skipped: bool,
}

impl CsvRecordSource<BufReader<tokio::fs::File>> {
    /// Open a sensor log on disk. Fails if the file cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
        ))
    }
}

impl<R: AsyncBufRead + Unpin + Send> CsvRecordSource<R> {
    /// Wrap any buffered reader, e.g. an in-memory cursor.
    pub fn from_reader(reader: R, name: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            name: name.into(),
            line_number: 0,
            header_skipped: false,
        }
    }

    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        let line = self.lines.next_line().await?;
        if line.is_some() {
            self.line_number += 1;
        }
        Ok(line)
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> RecordSource for CsvRecordSource<R> {
    async fn next_record(&mut self) -> Result<RecordEvent, SourceError> {
        if !self.header_skipped {
            self.header_skipped = true;
            if self.next_line().await?.is_none() {
                return Ok(RecordEvent::Eof);
            }
        }

        match self.next_line().await? {
            Some(line) => Ok(RecordEvent::Record(parse_row(&line, self.line_number)?)),
            None => Ok(RecordEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Replay Source (pre-loaded records)
// ============================================================================

/// Replays records already held in memory.
pub struct ReplaySource {
    records: std::vec::IntoIter<SensorRecord>,
}

impl ReplaySource {
    pub fn new(records: Vec<SensorRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

#[async_trait]
impl RecordSource for ReplaySource {
    async fn next_record(&mut self) -> Result<RecordEvent, SourceError> {
        Ok(self
            .records
            .next()
            .map_or(RecordEvent::Eof, RecordEvent::Record))
    }

    fn source_name(&self) -> &str {
        "replay"
    }
}
