//! File counter source
//!
//! Re-reads a JSON array of rows from disk every tick. Useful when another
//! process dumps the DMV on a schedule, and for testing.

use std::path::PathBuf;

use mssql_perf::Row;
use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`File`]
pub enum Error {
    /// Wrapper for [`std::io::Error`]
    #[error("Failed to read {path:?}: {source}")]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
    /// Wrapper for [`serde_json::Error`]
    #[error("Failed to decode rows in {path:?}: {source}")]
    Json {
        /// Path being read
        path: PathBuf,
        /// Underlying decoding error
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "snake_case")]
/// Configuration for [`File`]
pub struct Config {
    /// Path of the JSON file holding the rows
    pub path: PathBuf,
}

/// The `File` source implementation.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new [`File`] instance
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { path: config.path }
    }

    /// Read and decode the rows file.
    ///
    /// # Errors
    ///
    /// Function will return an error if the file cannot be read or does not
    /// hold a JSON array of rows.
    pub async fn fetch(&self) -> Result<Vec<Row>, Error> {
        let contents = tokio::fs::read(&self.path).await.map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&contents).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_rows() {
        let dir = tempfile::tempdir().expect("directory could not be created");
        let path = dir.path().join("rows.json");
        std::fs::write(
            &path,
            r#"[{"object_name": "SQLServer:Locks", "counter_name": "Lock Waits/sec",
                 "instance_name": "_Total", "cntr_value": 9, "cntr_type": 272696576}]"#,
        )
        .expect("rows file could not be written");

        let file = File::new(Config { path });
        let rows = file.fetch().await.expect("fetch should succeed");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].counter_name, "Lock Waits/sec");
        assert_eq!(rows[0].instance_name, "_Total");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("directory could not be created");
        let file = File::new(Config {
            path: dir.path().join("absent.json"),
        });
        assert!(matches!(file.fetch().await, Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("directory could not be created");
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "not json").expect("rows file could not be written");
        let file = File::new(Config { path });
        assert!(matches!(file.fetch().await, Err(Error::Json { .. })));
    }
}
