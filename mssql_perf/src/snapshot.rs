//! Grouping of one poll's rows by counter type

use rustc_hash::FxHashMap;

use crate::row::{LARGE_RAW_BASE, Row};

/// All rows sampled at one poll, bucketed by `cntr_type`.
///
/// Rows keep their input order within a bucket. Rows of unknown type are kept
/// too; rejecting them is the dispatcher's concern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    buckets: FxHashMap<u32, Vec<Row>>,
}

/// Trim every row and bucket it by type code.
#[must_use]
pub fn group<I>(rows: I) -> Snapshot
where
    I: IntoIterator<Item = Row>,
{
    let mut buckets: FxHashMap<u32, Vec<Row>> = FxHashMap::default();
    for mut row in rows {
        row.trim();
        buckets.entry(row.type_code).or_default().push(row);
    }
    Snapshot { buckets }
}

impl FromIterator<Row> for Snapshot {
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        group(iter)
    }
}

impl Snapshot {
    /// Rows of the given type code, empty if there are none.
    #[must_use]
    pub fn rows(&self, type_code: u32) -> &[Row] {
        self.buckets
            .get(&type_code)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rows of the base type, `PERF_LARGE_RAW_BASE`.
    #[must_use]
    pub fn bases(&self) -> &[Row] {
        self.rows(LARGE_RAW_BASE)
    }

    /// Iterate over `(type_code, rows)` buckets in no particular order.
    pub fn buckets(&self) -> impl Iterator<Item = (u32, &[Row])> {
        self.buckets.iter().map(|(code, rows)| (*code, rows.as_slice()))
    }

    /// Total number of rows across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// True if no row was sampled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}
