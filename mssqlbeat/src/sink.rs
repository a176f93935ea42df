//! Publish events
//!
//! A sink receives one [`Event`] per successful poll. Failing to publish is
//! fatal to the beat: there is no buffering or retry.

use mssql_perf::Event;
use serde::Deserialize;

pub mod jsonl;
pub mod prometheus;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Sink`]
pub enum Error {
    /// See [`crate::sink::jsonl::Error`] for details.
    #[error("JSONL sink: {0}")]
    Jsonl(#[from] jsonl::Error),
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
/// Configuration for [`Sink`]
pub enum Config {
    /// See [`crate::sink::jsonl::Config`] for details.
    Jsonl(jsonl::Config),
    /// See [`crate::sink::prometheus::Config`] for details.
    Prometheus(prometheus::Config),
}

#[derive(Debug)]
/// Where events go.
pub enum Sink {
    /// See [`crate::sink::jsonl::Jsonl`] for details.
    Jsonl(jsonl::Jsonl<std::io::BufWriter<std::fs::File>>),
    /// See [`crate::sink::prometheus::Prometheus`] for details.
    Prometheus(prometheus::Prometheus),
}

impl Sink {
    /// Create a new [`Sink`] instance
    ///
    /// The Prometheus sink only records gauges; installing the exporter that
    /// serves them is up to the caller.
    ///
    /// # Errors
    ///
    /// Function will return an error if the underlying sink cannot be opened.
    pub fn new(config: Config) -> Result<Self, Error> {
        let sink = match config {
            Config::Jsonl(conf) => Self::Jsonl(jsonl::Jsonl::open(&conf.path)?),
            Config::Prometheus(_) => Self::Prometheus(prometheus::Prometheus::new()),
        };
        Ok(sink)
    }

    /// Publish `event`.
    ///
    /// # Errors
    ///
    /// Function will return an error if the event could not be written.
    pub fn publish(&mut self, event: &Event) -> Result<(), Error> {
        match self {
            Sink::Jsonl(inner) => inner.publish(event)?,
            Sink::Prometheus(inner) => inner.publish(event),
        }
        Ok(())
    }
}
