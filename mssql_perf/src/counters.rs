//! Counter selection
//!
//! `sys.dm_os_performance_counters` exposes thousands of rows. Only a curated
//! set of counters is interesting enough to ship, plus every base counter since
//! those are needed as denominators.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::row::{LARGE_RAW_BASE, Row};

/// Names of the counters reported under [`Filter::Known`].
pub const KNOWN: &[&str] = &[
    "SQL Compilations/sec",
    "SQL Re-Compilations/sec",
    "User Connections",
    "Batch Requests/sec",
    "Logouts/sec",
    "Logins/sec",
    "Processes blocked",
    "Latch Waits/sec",
    "Full Scans/sec",
    "Index Searches/sec",
    "Page Splits/sec",
    "Page Lookups/sec",
    "Page Reads/sec",
    "Page Writes/sec",
    "Readahead Pages/sec",
    "Lazy Writes/sec",
    "Checkpoint Pages/sec",
    "Page life expectancy",
    "Log File(s) Size (KB)",
    "Log File(s) Used Size (KB)",
    "Data File(s) Size (KB)",
    "Transactions/sec",
    "Write Transactions/sec",
    "Active Temp Tables",
    "Temp Tables Creation Rate",
    "Temp Tables For Destruction",
    "Free Space in tempdb (KB)",
    "Version Store Size (KB)",
    "Memory Grants Pending",
    "Memory Grants Outstanding",
    "Free list stalls/sec",
    "Buffer cache hit ratio",
    "Buffer cache hit ratio base",
    "Backup/Restore Throughput/sec",
    "Total Server Memory (KB)",
    "Target Server Memory (KB)",
    "Log Flushes/sec",
    "Log Flush Wait Time",
    "Memory broker clerk size",
    "Log Bytes Flushed/sec",
    "Bytes Sent to Replica/sec",
    "Log Send Queue",
    "Bytes Sent to Transport/sec",
    "Sends to Replica/sec",
    "Sends to Transport/sec",
    "Bytes Received from Replica/sec",
    "Receives from Replica/sec",
    "Flow Control Time (ms/sec)",
    "Flow Control/sec",
    "Resent Messages/sec",
    "Redone Bytes/sec",
    "XTP Memory Used (KB)",
    "Transaction Delay",
    "Log Bytes Received/sec",
    "Log Apply Pending Queue",
    "Recovery Queue",
    "Log Apply Ready Queue",
    "CPU usage %",
    "CPU usage % base",
    "Queued requests",
    "Requests completed/sec",
    "Blocked tasks",
    "Active memory grant amount (KB)",
    "Disk Read Bytes/sec",
    "Disk Read IO Throttled/sec",
    "Disk Read IO/sec",
    "Disk Write Bytes/sec",
    "Disk Write IO Throttled/sec",
    "Disk Write IO/sec",
    "Used memory (KB)",
    "Forwarded Records/sec",
    "Background Writer pages/sec",
    "Percent Log Used",
    "Log Send Queue KB",
    "Redo Queue KB",
    "Average Latch Wait Time (ms)",
    "Average Wait Time (ms)",
    "Avg Disk Read IO (ms)",
    "Avg Disk Write IO (ms)",
    "Avg Dist From EOL/LP Request",
    "Avg time delete FileTable item",
    "Avg time FileTable enumeration",
    "Avg time FileTable handle kill",
    "Avg time move FileTable item",
    "Avg time per file I/O request",
    "Avg time per file I/O response",
    "Avg time rename FileTable item",
    "Avg time to get FileTable item",
    "Avg time update FileTable item",
    "Avg. Bytes/Read",
    "Avg. Bytes/Transfer",
    "Avg. Bytes/Write",
    "Avg. Length of Batched Writes",
    "Avg. microsec/Read",
    "Avg. microsec/Read Comp",
    "Avg. microsec/Transfer",
    "Avg. microsec/Write",
    "Avg. microsec/Write Comp",
    "Avg. Time Between Batches (ms)",
    "Avg. Time to Write Batch (ms)",
    "Msg Fragment Recv Size Avg",
    "Msg Fragment Send Size Avg",
    "Receive I/O Len Avg",
    "Send I/O Len Avg",
    "Update conflict ratio",
    "XTP Controller DLC Latency/Fetch",
];

static KNOWN_SET: Lazy<FxHashSet<&'static str>> = Lazy::new(|| KNOWN.iter().copied().collect());

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Which rows of a fetched table take part in a poll.
pub enum Filter {
    /// Rows named in [`KNOWN`] and every base row.
    #[default]
    Known,
    /// Every row.
    All,
}

impl Filter {
    /// True if `row` takes part in a poll. Padding around the counter name is
    /// ignored.
    #[must_use]
    pub fn keep(self, row: &Row) -> bool {
        match self {
            Filter::All => true,
            Filter::Known => {
                row.type_code == LARGE_RAW_BASE || KNOWN_SET.contains(row.counter_name.trim())
            }
        }
    }

    /// Retain only the rows this filter keeps.
    pub fn apply(self, rows: &mut Vec<Row>) {
        rows.retain(|row| self.keep(row));
    }
}
