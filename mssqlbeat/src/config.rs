//! This module controls configuration parsing from the end user, providing a
//! convenience mechanism for the rest of the program. Crashes are most likely
//! to originate from this code, intentionally.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use mssql_perf::counters::Filter;
use serde::Deserialize;

use crate::{sink, source};

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading config file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The poll period must be positive
    #[error("period_milliseconds must be greater than zero")]
    ZeroPeriod,
}

fn default_period() -> u64 {
    1_000
}

/// Main configuration struct for this program
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The period on which the counter table is polled.
    #[serde(default = "default_period")]
    pub period_milliseconds: u64,
    /// Which counters take part in a poll.
    #[serde(default)]
    pub counters: Filter,
    /// Where counter rows come from.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub source: source::Config,
    /// Where events go.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub sink: sink::Config,
}

impl Config {
    /// Parse and validate a YAML configuration.
    ///
    /// # Errors
    ///
    /// Function will return an error if `contents` is not a valid
    /// configuration.
    pub fn from_yaml(contents: &str) -> Result<Self, Error> {
        let config: Config = serde_yaml::from_str(contents)?;
        if config.period_milliseconds == 0 {
            return Err(Error::ZeroPeriod);
        }
        Ok(config)
    }

    /// The poll period.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_milliseconds)
    }
}

/// Load configuration from the file at `path`.
///
/// # Errors
///
/// Function will return an error if the file cannot be read or does not hold
/// a valid configuration.
pub fn load_config_from_path(path: &Path) -> Result<Config, Error> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    Config::from_yaml(&contents)
}
