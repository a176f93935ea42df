//! Raw rows of `sys.dm_os_performance_counters`
//!
//! A [`Row`] is one sampled counter exactly as the server reports it, save for
//! whitespace trimming. The `cntr_type` column classifies how the raw value has
//! to be interpreted, see [`CounterType`].

use serde::{Deserialize, Deserializer, Serialize};

/// `PERF_LARGE_RAWCOUNT`
pub const LARGE_RAWCOUNT: u32 = 65_792;
/// `PERF_COUNTER_BULK_COUNT`
pub const COUNTER_BULK_COUNT: u32 = 272_696_576;
/// `PERF_LARGE_RAW_FRACTION`
pub const LARGE_RAW_FRACTION: u32 = 537_003_264;
/// `PERF_AVERAGE_BULK`
pub const AVERAGE_BULK: u32 = 1_073_874_176;
/// `PERF_LARGE_RAW_BASE`
pub const LARGE_RAW_BASE: u32 = 1_073_939_712;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The counter type families this crate knows how to interpret.
pub enum CounterType {
    /// Instantaneous value, reported as-is.
    LargeRawCount,
    /// Cumulative count, reported as-is.
    BulkCount,
    /// Percentage of a companion base counter.
    LargeRawFraction,
    /// Ratio of deltas against a companion base counter between two polls.
    AverageBulk,
    /// Denominator for other counters, never reported on its own.
    LargeRawBase,
}

impl TryFrom<u32> for CounterType {
    type Error = u32;

    /// Returns the unrecognized code on failure.
    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            LARGE_RAWCOUNT => Ok(CounterType::LargeRawCount),
            COUNTER_BULK_COUNT => Ok(CounterType::BulkCount),
            LARGE_RAW_FRACTION => Ok(CounterType::LargeRawFraction),
            AVERAGE_BULK => Ok(CounterType::AverageBulk),
            LARGE_RAW_BASE => Ok(CounterType::LargeRawBase),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One sampled row.
///
/// Field names on the wire are the column names of the DMV.
pub struct Row {
    /// Performance object, e.g. `SQLServer:General Statistics`.
    pub object_name: String,
    /// Counter name, never empty.
    pub counter_name: String,
    /// Instance name, empty when the counter is not instance scoped.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub instance_name: String,
    /// The raw counter reading.
    #[serde(rename = "cntr_value")]
    pub value: i64,
    /// The counter type code, see [`CounterType`].
    #[serde(rename = "cntr_type")]
    pub type_code: u32,
}

impl Row {
    /// Construct a new `Row`. No trimming is performed here.
    #[must_use]
    pub fn new(
        object_name: impl Into<String>,
        counter_name: impl Into<String>,
        instance_name: impl Into<String>,
        value: i64,
        type_code: u32,
    ) -> Self {
        Self {
            object_name: object_name.into(),
            counter_name: counter_name.into(),
            instance_name: instance_name.into(),
            value,
            type_code,
        }
    }

    /// Remove leading and trailing whitespace from the textual columns.
    ///
    /// The DMV pads `nchar` columns with spaces.
    pub(crate) fn trim(&mut self) {
        trim_in_place(&mut self.object_name);
        trim_in_place(&mut self.counter_name);
        trim_in_place(&mut self.instance_name);
    }

    /// True if `other` samples the same counter as `self`.
    #[must_use]
    pub fn same_counter(&self, other: &Row) -> bool {
        self.counter_name == other.counter_name && self.instance_name == other.instance_name
    }
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
