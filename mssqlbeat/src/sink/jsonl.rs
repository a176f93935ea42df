//! JSONL sink
//!
//! Writes one JSON object per event, one event per line, and flushes after
//! every event.

use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use mssql_perf::Event;
use serde::{Deserialize, Serialize};

/// JSONL sink errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// IO errors during write operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "snake_case")]
/// Configuration for [`Jsonl`]
pub struct Config {
    /// File to append events to, created if absent
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
/// The structure of one output line.
pub struct Line {
    /// Milliseconds since the unix epoch at which the event was assembled.
    pub timestamp: u128,
    /// Metric key to value, sorted by key.
    pub fields: BTreeMap<String, f64>,
}

impl From<&Event> for Line {
    fn from(event: &Event) -> Self {
        Self {
            timestamp: event.timestamp_millis(),
            fields: event
                .fields
                .iter()
                .map(|(key, value)| (key.clone(), *value))
                .collect(),
        }
    }
}

/// JSONL event writer
#[derive(Debug)]
pub struct Jsonl<W: Write> {
    writer: W,
}

impl Jsonl<BufWriter<File>> {
    /// Open `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Jsonl<W> {
    /// Create a new instance of `Jsonl`
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write `event` as a single line and flush.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn publish(&mut self, event: &Event) -> Result<(), Error> {
        let payload = serde_json::to_string(&Line::from(event))?;
        self.writer.write_all(payload.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
