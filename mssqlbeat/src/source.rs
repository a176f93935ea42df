//! Fetch counter rows from SQL Server
//!
//! A source produces the raw rows of `sys.dm_os_performance_counters` once per
//! tick. Rows travel as JSON arrays of objects keyed by the DMV's column names;
//! see [`mssql_perf::Row`].

use mssql_perf::Row;
use serde::Deserialize;

pub mod file;
pub mod http;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Source`]
pub enum Error {
    /// See [`crate::source::http::Error`] for details.
    #[error("HTTP source: {0}")]
    Http(#[from] http::Error),
    /// See [`crate::source::file::Error`] for details.
    #[error("File source: {0}")]
    File(#[from] file::Error),
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
/// Configuration for [`Source`]
pub enum Config {
    /// See [`crate::source::http::Config`] for details.
    Http(http::Config),
    /// See [`crate::source::file::Config`] for details.
    File(file::Config),
}

#[derive(Debug)]
/// The source of counter rows.
pub enum Source {
    /// See [`crate::source::http::Http`] for details.
    Http(http::Http),
    /// See [`crate::source::file::File`] for details.
    File(file::File),
}

impl Source {
    /// Create a new [`Source`] instance
    ///
    /// # Errors
    ///
    /// Function will return an error if the underlying source cannot be
    /// constructed.
    pub fn new(config: Config) -> Result<Self, Error> {
        let source = match config {
            Config::Http(conf) => Self::Http(http::Http::new(conf)?),
            Config::File(conf) => Self::File(file::File::new(conf)),
        };
        Ok(source)
    }

    /// Fetch one snapshot worth of rows.
    ///
    /// # Errors
    ///
    /// Function will return an error if the rows cannot be retrieved or
    /// decoded.
    pub async fn fetch(&self) -> Result<Vec<Row>, Error> {
        match self {
            Source::Http(inner) => inner.fetch().await.map_err(Error::Http),
            Source::File(inner) => inner.fetch().await.map_err(Error::File),
        }
    }
}
