//! SQL Server performance counter normalization
//!
//! This library turns rows of `sys.dm_os_performance_counters` into flat,
//! named numeric metrics. Each counter type needs its own arithmetic, some
//! against a companion base counter, one against the sample of the previous
//! poll. The caller fetches the rows, owns the [`History`] between polls and
//! ships the resulting [`Event`]; nothing here performs I/O.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

pub mod calculate;
pub mod counters;
pub mod event;
pub mod history;
pub mod key;
pub mod poll;
pub mod row;
pub mod snapshot;

pub use calculate::Error;
pub use event::{Event, Metric};
pub use history::History;
pub use poll::poll;
pub use row::{CounterType, Row};
pub use snapshot::Snapshot;
