//! HTTP counter source
//!
//! Fetches the counter table from an HTTP endpoint, typically a small exporter
//! running next to SQL Server that executes the DMV query and returns the rows
//! as JSON.

use std::time::Duration;

use mssql_perf::Row;
use serde::Deserialize;
use tracing::trace;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Http`]
pub enum Error {
    /// Wrapper for [`reqwest::Error`]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
}

fn default_timeout_milliseconds() -> u64 {
    1_000
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "snake_case")]
/// Configuration for [`Http`]
pub struct Config {
    /// URI to fetch rows from
    pub uri: String,
    /// Request timeout
    #[serde(default = "default_timeout_milliseconds")]
    pub timeout_milliseconds: u64,
}

/// The `Http` source implementation.
#[derive(Debug)]
pub struct Http {
    uri: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl Http {
    /// Create a new [`Http`] instance
    ///
    /// # Errors
    ///
    /// Function will return an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            uri: config.uri,
            timeout: Duration::from_millis(config.timeout_milliseconds),
            client,
        })
    }

    /// GET the configured URI and decode its body as rows.
    ///
    /// # Errors
    ///
    /// Function will return an error on transport failure, a non-success
    /// status or an undecodable body.
    pub async fn fetch(&self) -> Result<Vec<Row>, Error> {
        let rows: Vec<Row> = self
            .client
            .get(&self.uri)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        trace!("fetched {} rows from {}", rows.len(), self.uri);
        Ok(rows)
    }
}
