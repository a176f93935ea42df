//! Metric key construction
//!
//! Keys are dotted paths rooted at [`PREFIX`]. Counter and instance names are
//! passed through [`sanitize`] so that each becomes a single path segment.

use crate::row::Row;

/// Root segment of every metric key.
pub const PREFIX: &str = "dm_os_performance_counters";

/// Normalize `text` into a path-safe key segment.
///
/// Lowercases, turns whitespace and `/` into `_` and drops `.`, `(` and `)`.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '.' | '(' | ')' => {}
            '/' => out.push('_'),
            c if c.is_whitespace() => out.push('_'),
            c => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Build the metric key for `row`.
///
/// The instance segment is appended only when a `base` row is given and the
/// *base* is instance scoped. The row's own instance name does not decide
/// this.
#[must_use]
pub fn metric_key(row: &Row, base: Option<&Row>) -> String {
    match base {
        Some(base) if !base.instance_name.is_empty() => format!(
            "{PREFIX}.{counter}.{instance}",
            counter = sanitize(&row.counter_name),
            instance = sanitize(&row.instance_name),
        ),
        _ => format!("{PREFIX}.{counter}", counter = sanitize(&row.counter_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{AVERAGE_BULK, LARGE_RAW_BASE, LARGE_RAWCOUNT};
    use proptest::prelude::*;

    #[test]
    fn sanitize_examples() {
        assert_eq!(sanitize("User Connections"), "user_connections");
        assert_eq!(sanitize("Log File(s) Size (KB)"), "log_files_size_kb");
        assert_eq!(sanitize("Batch Requests/sec"), "batch_requests_sec");
        assert_eq!(sanitize("Avg. microsec/Read"), "avg_microsec_read");
        assert_eq!(sanitize("CPU usage %"), "cpu_usage_%");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn key_without_base_drops_instance() {
        let row = Row::new("o", "Active Temp Tables", "tempdb", 1, LARGE_RAWCOUNT);
        assert_eq!(
            metric_key(&row, None),
            "dm_os_performance_counters.active_temp_tables"
        );
    }

    #[test]
    fn key_follows_base_instance() {
        let row = Row::new("o", "Average Wait Time (ms)", "Database", 1, AVERAGE_BULK);
        let scoped = Row::new("o", "Average Wait Time Base", "Database", 1, LARGE_RAW_BASE);
        let unscoped = Row::new("o", "Average Wait Time Base", "", 1, LARGE_RAW_BASE);
        assert_eq!(
            metric_key(&row, Some(&scoped)),
            "dm_os_performance_counters.average_wait_time_ms.database"
        );
        assert_eq!(
            metric_key(&row, Some(&unscoped)),
            "dm_os_performance_counters.average_wait_time_ms"
        );
    }

    #[test]
    fn key_with_unscoped_row_and_scoped_base() {
        // The row's own instance is empty, still the base decides.
        let row = Row::new("o", "Buffer cache hit ratio", "", 1, LARGE_RAWCOUNT);
        let base = Row::new("o", "Buffer cache hit ratio base", "x", 1, LARGE_RAW_BASE);
        assert_eq!(
            metric_key(&row, Some(&base)),
            "dm_os_performance_counters.buffer_cache_hit_ratio."
        );
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(text in "[A-Za-z0-9 \t./()%:_#-]{0,48}") {
            let once = sanitize(&text);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn sanitize_output_has_no_separators(text in "[A-Za-z0-9 \t./()%:_#-]{0,48}") {
            let out = sanitize(&text);
            prop_assert!(!out.contains(|c: char| c.is_whitespace() || "/.()".contains(c)));
        }

        #[test]
        fn metric_key_is_deterministic(
            counter in "[A-Za-z][A-Za-z0-9 /()%.]{0,32}",
            instance in "[A-Za-z0-9 _]{0,16}",
        ) {
            let row = Row::new("o", counter.clone(), instance.clone(), 0, AVERAGE_BULK);
            let base = Row::new("o", format!("{counter} Base"), instance, 0, LARGE_RAW_BASE);
            prop_assert_eq!(metric_key(&row, Some(&base)), metric_key(&row, Some(&base)));
            prop_assert_eq!(metric_key(&row, None), metric_key(&row.clone(), None));
        }
    }
}
