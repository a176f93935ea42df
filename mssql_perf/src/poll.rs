//! One poll of the normalization engine

use std::time::SystemTime;

use crate::{
    calculate::{self, calculate},
    event::{self, Event, Metric},
    history::History,
    row::{LARGE_RAW_BASE, Row},
    snapshot::{self, Snapshot},
};

/// Normalize one poll's `rows` into an [`Event`].
///
/// The rows are grouped into a snapshot, every non-base row is run through
/// its calculator against that snapshot and the one retained in `history`,
/// and on success `history` advances to the new snapshot. The event is
/// stamped once all metrics are computed.
///
/// # Errors
///
/// Any calculator error fails the whole poll: no event is produced and
/// `history` is left untouched so the next poll computes deltas against the
/// last good snapshot.
pub fn poll<I>(rows: I, history: &mut History) -> Result<Event, calculate::Error>
where
    I: IntoIterator<Item = Row>,
{
    let current = snapshot::group(rows);
    let metrics = normalize(&current, history.previous())?;
    history.advance(current);
    Ok(event::assemble(metrics, SystemTime::now()))
}

/// Compute every metric `current` yields, given the `previous` snapshot.
///
/// Buckets are visited in ascending type code order so that, with several
/// bad rows, the reported error is stable between runs.
///
/// # Errors
///
/// See [`calculate::calculate`].
pub fn normalize(
    current: &Snapshot,
    previous: Option<&Snapshot>,
) -> Result<Vec<Metric>, calculate::Error> {
    let mut buckets: Vec<(u32, &[Row])> = current
        .buckets()
        .filter(|(code, _)| *code != LARGE_RAW_BASE)
        .collect();
    buckets.sort_unstable_by_key(|(code, _)| *code);

    let mut metrics = Vec::with_capacity(current.len());
    for (_, rows) in buckets {
        for row in rows {
            if let Some(metric) = calculate(row, current, previous)? {
                metrics.push(metric);
            }
        }
    }
    Ok(metrics)
}
