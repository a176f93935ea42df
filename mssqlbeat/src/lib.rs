//! The mssqlbeat library
//!
//! Polls SQL Server's performance counter table on a fixed period and ships
//! the normalized values as events. The arithmetic lives in [`mssql_perf`];
//! this crate is the host around it: where rows come from, where events go,
//! and the loop between.

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
#![allow(clippy::multiple_crate_versions)]

pub mod beat;
pub mod config;
pub mod signals;
pub mod sink;
pub mod source;
