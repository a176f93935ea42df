//! Output of a poll
//!
//! The calculators produce [`Metric`] values which [`assemble`] folds into a
//! single [`Event`], the unit handed to a sink.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
/// One normalized value.
pub struct Metric {
    /// Dotted key, see [`crate::key::metric_key`].
    pub key: String,
    /// The normalized value.
    pub value: f64,
}

impl Metric {
    /// Construct a new `Metric`.
    #[must_use]
    pub fn new(key: String, value: f64) -> Self {
        Self { key, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// The record published once per successful poll.
pub struct Event {
    /// Wall-clock time of assembly.
    pub timestamp: SystemTime,
    /// Metric key to value.
    pub fields: FxHashMap<String, f64>,
}

impl Event {
    /// Milliseconds since the unix epoch of [`Event::timestamp`], zero if the
    /// clock reads earlier than the epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis()
    }

    /// Number of fields in this event.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if this event has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Fold `metrics` into an [`Event`] stamped with `now`.
///
/// A repeated key overwrites the earlier value.
#[must_use]
pub fn assemble<I>(metrics: I, now: SystemTime) -> Event
where
    I: IntoIterator<Item = Metric>,
{
    let mut fields = FxHashMap::default();
    for Metric { key, value } in metrics {
        fields.insert(key, value);
    }
    Event {
        timestamp: now,
        fields,
    }
}
