//! Per-type counter calculations
//!
//! Each counter type family needs its own arithmetic before the raw value
//! means anything. [`calculate`] dispatches a row to the right calculation.
//! Base rows (`PERF_LARGE_RAW_BASE`) are never reported themselves, they are
//! only looked up as denominators.
//!
//! All ratios use exact floating point division.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::{
    event::Metric,
    key::metric_key,
    row::{CounterType, Row},
    snapshot::Snapshot,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors produced by [`calculate`]. Both fail the whole poll.
pub enum Error {
    /// The row's `cntr_type` is none of the known families.
    #[error("Unknown counter type: {0}")]
    UnknownCounterType(u32),
    /// A `PERF_LARGE_RAW_FRACTION` row had no companion base row.
    #[error("Base counter not found for {counter}: {base}")]
    BaseNotFound {
        /// Name of the fraction counter
        counter: String,
        /// Name of the base counter that was searched for
        base: String,
    },
}

/// Compute the metric for `row`, if any.
///
/// `current` is the snapshot `row` belongs to, `previous` the snapshot taken
/// one poll earlier. `Ok(None)` means the row produces nothing this poll.
///
/// # Errors
///
/// Returns an error if the row's type is unknown or if a fraction counter has
/// no base counter in `current`.
pub fn calculate(
    row: &Row,
    current: &Snapshot,
    previous: Option<&Snapshot>,
) -> Result<Option<Metric>, Error> {
    let counter_type = CounterType::try_from(row.type_code).map_err(Error::UnknownCounterType)?;
    match counter_type {
        CounterType::LargeRawCount | CounterType::BulkCount => Ok(Some(raw(row))),
        CounterType::LargeRawFraction => large_raw_fraction(row, current).map(Some),
        CounterType::AverageBulk => Ok(average_bulk(row, current, previous)),
        CounterType::LargeRawBase => Ok(None),
    }
}

/// `PERF_LARGE_RAWCOUNT` and `PERF_COUNTER_BULK_COUNT`: the raw value as-is.
#[must_use]
pub fn raw(row: &Row) -> Metric {
    Metric::new(metric_key(row, None), row.value as f64)
}

/// `PERF_LARGE_RAW_FRACTION`: percentage of the `"<name> base"` counter.
///
/// The base is the last row named `"<name> base"`, whatever its instance. A
/// zero base yields `0.0`.
///
/// # Errors
///
/// Returns [`Error::BaseNotFound`] if `current` holds no base row named
/// `"<name> base"`.
pub fn large_raw_fraction(row: &Row, current: &Snapshot) -> Result<Metric, Error> {
    let base_name = format!("{} base", row.counter_name);

    let Some(base) = current
        .bases()
        .iter()
        .rev()
        .find(|b| b.counter_name == base_name)
    else {
        return Err(Error::BaseNotFound {
            counter: row.counter_name.clone(),
            base: base_name,
        });
    };

    let value = if base.value == 0 {
        0.0
    } else {
        100.0 * row.value as f64 / base.value as f64
    };
    Ok(Metric::new(metric_key(row, Some(base)), value))
}

/// `PERF_AVERAGE_BULK`: change of the counter over change of its base since
/// the previous poll.
///
/// Produces nothing on the first poll. When the base, the previous sample or
/// the previous base cannot be found a warning is logged and nothing is
/// produced. A zero base delta yields `0.0`.
#[must_use]
pub fn average_bulk(
    row: &Row,
    current: &Snapshot,
    previous: Option<&Snapshot>,
) -> Option<Metric> {
    // Reference values only exist from the second poll on.
    let previous = previous.filter(|p| !p.is_empty())?;

    let base_name = average_base_name(&row.counter_name);
    let matches_base = |b: &&Row| {
        b.instance_name == row.instance_name && b.counter_name.to_lowercase() == base_name
    };

    let Some(base) = current.bases().iter().rev().find(matches_base) else {
        warn!("Base counter not found for {}: {}", row.counter_name, base_name);
        return None;
    };
    let Some(last) = previous
        .rows(row.type_code)
        .iter()
        .rev()
        .find(|r| r.same_counter(row))
    else {
        warn!("Last counter not found for {}", row.counter_name);
        return None;
    };
    let Some(last_base) = previous.bases().iter().rev().find(matches_base) else {
        warn!("Last base counter not found for {}: {}", row.counter_name, base_name);
        return None;
    };

    let delta = i128::from(row.value) - i128::from(last.value);
    let base_delta = i128::from(base.value) - i128::from(last_base.value);
    let ratio = if base_delta == 0 {
        0.0
    } else {
        delta as f64 / base_delta as f64
    };
    Some(Metric::new(metric_key(row, Some(base)), ratio))
}

/// Lowercased name of the base counter for an average counter: any trailing
/// parenthesized unit is dropped and `" Base"` appended.
fn average_base_name(counter_name: &str) -> String {
    static UNIT_SUFFIX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\s\(.*\)$").expect("Invalid regex pattern provided"));
    let stem = UNIT_SUFFIX.replace(counter_name, "");
    format!("{stem} Base").to_lowercase()
}
