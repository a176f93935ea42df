//! Single-slot history of the previous snapshot
//!
//! `PERF_AVERAGE_BULK` counters are only meaningful as a change between two
//! polls. [`History`] holds the last successfully processed [`Snapshot`] so the
//! next poll can compute that change. The slot is owned by whoever drives the
//! polls and is passed into [`crate::poll`] explicitly.

use crate::snapshot::Snapshot;

#[derive(Debug, Default, Clone)]
/// The snapshot of the previous successful poll, if there was one.
pub struct History {
    previous: Option<Snapshot>,
}

impl History {
    /// Create an empty `History`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The previous snapshot, `None` before the first successful poll.
    #[must_use]
    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Replace the retained snapshot with `current`, returning the one it
    /// displaces.
    pub fn advance(&mut self, current: Snapshot) -> Option<Snapshot> {
        self.previous.replace(current)
    }
}
