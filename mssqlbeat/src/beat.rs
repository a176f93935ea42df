//! The polling loop
//!
//! [`Beat`] drives one poll per period: fetch rows from the [`Source`], keep
//! the counters of interest, normalize them against the retained
//! [`History`] and hand the event to the [`Sink`]. Polls never overlap; a
//! tick that comes due while a poll runs is delayed.
//!
//! A poll that fails, because the source is unreachable or the rows cannot be
//! normalized, fails only its own tick. The history keeps the last good
//! snapshot and the next tick tries again. A sink that cannot be written to
//! ends the run.

use std::time::Duration;

use metrics::{counter, gauge};
use mssql_perf::{History, counters::Filter};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    signals::Watcher,
    sink::{self, Sink},
    source::{self, Source},
};

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Beat`]
pub enum Error {
    /// See [`crate::source::Error`] for details.
    #[error("Source error: {0}")]
    Source(#[from] source::Error),
    /// See [`crate::sink::Error`] for details.
    #[error("Sink error: {0}")]
    Sink(#[from] sink::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What became of one tick.
pub enum Tick {
    /// An event with this many fields was published.
    Published(usize),
    /// The source could not deliver rows.
    SourceFailed,
    /// The rows could not be normalized.
    PollFailed,
}

/// Everything a single tick needs, kept apart from the loop's timer and
/// shutdown handling.
#[derive(Debug)]
pub struct Poller {
    source: Source,
    sink: Sink,
    filter: Filter,
    history: History,
}

impl Poller {
    /// Create a new [`Poller`] instance
    #[must_use]
    pub fn new(source: Source, sink: Sink, filter: Filter) -> Self {
        Self {
            source,
            sink,
            filter,
            history: History::new(),
        }
    }

    /// Run one poll.
    ///
    /// # Errors
    ///
    /// Function will return an error only if the sink fails. Source and
    /// normalization failures are logged and reported through [`Tick`].
    pub async fn tick(&mut self) -> Result<Tick, Error> {
        counter!("mssqlbeat.polls").increment(1);

        let mut rows = match self.source.fetch().await {
            Ok(rows) => rows,
            Err(err) => {
                warn!("Failed to fetch performance counters: {err}");
                counter!("mssqlbeat.source_failures").increment(1);
                return Ok(Tick::SourceFailed);
            }
        };
        let fetched = rows.len();
        self.filter.apply(&mut rows);
        let kept = rows.len();

        let event = match mssql_perf::poll(rows, &mut self.history) {
            Ok(event) => event,
            Err(err) => {
                error!("Poll failed, no event published: {err}");
                counter!("mssqlbeat.poll_failures").increment(1);
                return Ok(Tick::PollFailed);
            }
        };
        debug!(
            "fetched {fetched} rows, kept {kept}, produced {} metrics",
            event.len()
        );

        self.sink.publish(&event)?;
        Ok(Tick::Published(event.len()))
    }
}

/// The mssqlbeat host.
#[derive(Debug)]
pub struct Beat {
    poller: Poller,
    period: Duration,
    shutdown: Watcher,
}

impl Beat {
    /// Create a new [`Beat`] instance from `config`.
    ///
    /// # Errors
    ///
    /// Function will return an error if the configured source or sink cannot
    /// be constructed.
    pub fn new(config: Config, shutdown: Watcher) -> Result<Self, Error> {
        let period = config.period();
        let source = Source::new(config.source)?;
        let sink = Sink::new(config.sink)?;
        Ok(Self {
            poller: Poller::new(source, sink, config.counters),
            period,
            shutdown,
        })
    }

    /// Run this [`Beat`] until shutdown is signaled.
    ///
    /// The `mssqlbeat.running` gauge is 1 while the loop runs and 0 once it
    /// has stopped, for whatever reason.
    ///
    /// # Errors
    ///
    /// Function will return an error if the sink fails.
    pub async fn run(self) -> Result<(), Error> {
        info!("mssqlbeat is running, polling every {:?}", self.period);

        let mut poller = self.poller;
        let mut shutdown = self.shutdown;
        let shutdown_wait = shutdown.recv();
        tokio::pin!(shutdown_wait);

        let mut poll = time::interval(self.period);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    gauge!("mssqlbeat.running").set(1.0);
                    if let Err(err) = poller.tick().await {
                        gauge!("mssqlbeat.running").set(0.0);
                        return Err(err);
                    }
                }
                () = &mut shutdown_wait => {
                    info!("shutdown signal received");
                    gauge!("mssqlbeat.running").set(0.0);
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{signals::signal, sink::jsonl::Line};
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use mssql_perf::row::{AVERAGE_BULK, LARGE_RAW_BASE, LARGE_RAWCOUNT};
    use serde_json::json;
    use std::path::{Path, PathBuf};

    fn write_rows(path: &Path, wait: i64, wait_base: i64, extra_type: Option<u32>) {
        let row = |object: &str, counter: &str, instance: &str, value: i64, code: u32| {
            json!({"object_name": object, "counter_name": counter, "instance_name": instance,
                   "cntr_value": value, "cntr_type": code})
        };
        let mut rows = vec![
            row("SQLServer:General Statistics", "User Connections   ", "", 42, LARGE_RAWCOUNT),
            row("SQLServer:Locks", "Average Wait Time (ms)", "_Total", wait, AVERAGE_BULK),
            row("SQLServer:Locks", "Average Wait Time Base", "_Total", wait_base, LARGE_RAW_BASE),
            row("SQLServer:Locks", "Lock Timeouts/sec", "_Total", 3, LARGE_RAWCOUNT),
        ];
        if let Some(code) = extra_type {
            rows.push(row("SQLServer:General Statistics", "User Connections", "", 1, code));
        }
        std::fs::write(path, serde_json::to_vec(&rows).expect("rows serialize"))
            .expect("rows file could not be written");
    }

    fn read_lines(path: &Path) -> Vec<Line> {
        std::fs::read_to_string(path)
            .expect("events file should exist")
            .lines()
            .map(|l| serde_json::from_str(l).expect("line should deserialize"))
            .collect()
    }

    fn poller(rows: PathBuf, events: PathBuf) -> Poller {
        let source = Source::new(source::Config::File(source::file::Config { path: rows }))
            .expect("source should build");
        let sink = Sink::new(sink::Config::Jsonl(sink::jsonl::Config { path: events }))
            .expect("sink should open");
        Poller::new(source, sink, Filter::Known)
    }

    #[tokio::test]
    async fn ticks_publish_and_survive_failures() {
        let dir = tempfile::tempdir().expect("directory could not be created");
        let rows = dir.path().join("rows.json");
        let events = dir.path().join("events.jsonl");
        let mut poller = poller(rows.clone(), events.clone());

        // Nothing to read yet.
        assert_eq!(poller.tick().await.expect("tick"), Tick::SourceFailed);

        // First poll: no average yet, "Lock Timeouts/sec" is filtered.
        write_rows(&rows, 100, 10, None);
        assert_eq!(poller.tick().await.expect("tick"), Tick::Published(1));

        // Unknown counter type fails the tick only.
        write_rows(&rows, 105, 15, Some(999_999));
        assert_eq!(poller.tick().await.expect("tick"), Tick::PollFailed);

        // Delta against the last good snapshot.
        write_rows(&rows, 130, 30, None);
        assert_eq!(poller.tick().await.expect("tick"), Tick::Published(2));

        let lines = read_lines(&events);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0].fields.get("dm_os_performance_counters.user_connections"),
            Some(&42.0)
        );
        assert_eq!(
            lines[1]
                .fields
                .get("dm_os_performance_counters.average_wait_time_ms._total"),
            Some(&1.5)
        );
        assert!(lines[0].timestamp <= lines[1].timestamp);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let dir = tempfile::tempdir().expect("directory could not be created");
        let rows = dir.path().join("rows.json");
        let events = dir.path().join("events.jsonl");
        write_rows(&rows, 100, 10, None);

        let config = Config::from_yaml(&format!(
            "period_milliseconds: 10
source:
  file:
    path: {}
sink:
  jsonl:
    path: {}
",
            rows.display(),
            events.display()
        ))
        .expect("config should parse");

        // The test runtime is single threaded, the spawned loop records here.
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let (watcher, broadcaster) = signal();
        let beat = Beat::new(config, watcher).expect("beat should build");
        let handle = tokio::spawn(beat.run());

        time::sleep(Duration::from_millis(100)).await;
        broadcaster.signal();
        handle
            .await
            .expect("beat task should join")
            .expect("beat should stop cleanly");

        let lines = read_lines(&events);
        assert!(lines.len() >= 2);
        // Static input: from the second tick on the average has no change.
        assert_eq!(
            lines[1]
                .fields
                .get("dm_os_performance_counters.average_wait_time_ms._total"),
            Some(&0.0)
        );

        let running = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find_map(|(key, _, _, value)| match value {
                DebugValue::Gauge(v) if key.key().name() == "mssqlbeat.running" => {
                    Some(v.into_inner())
                }
                _ => None,
            });
        assert_eq!(running, Some(0.0));
    }
}
