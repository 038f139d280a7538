// Export batch selection
//
// The sort key name is decided by inspecting only the first accumulated
// record; that one name is then applied to every record. Records without
// the chosen key (or with a non-numeric value under it) order as 0 and so
// sort last. This first-record-only heuristic is load-bearing for
// compatibility with existing consumers; do not replace it with per-record
// detection.

use crate::value::{FieldValue, Record};

/// Preferred timestamp field.
pub const PRIMARY_SORT_KEY: &str = "event_timestamp";

/// Fallback when the first record lacks the preferred field.
pub const FALLBACK_SORT_KEY: &str = "timestamp";

/// Sort records newest-first and keep at most `max_items` of them.
///
/// The sort is stable: records with equal timestamps keep their scan-return
/// order. An empty input is returned untouched.
pub fn select_latest(mut records: Vec<Record>, max_items: usize) -> Vec<Record> {
    let Some(first) = records.first() else {
        return records;
    };

    let sort_key = if first.contains_key(PRIMARY_SORT_KEY) {
        PRIMARY_SORT_KEY
    } else {
        FALLBACK_SORT_KEY
    };

    records.sort_by(|a, b| ordering_value(b, sort_key).total_cmp(&ordering_value(a, sort_key)));
    records.truncate(max_items);
    records
}

fn ordering_value(record: &Record, sort_key: &str) -> f64 {
    record.get(sort_key).and_then(FieldValue::as_f64).unwrap_or(0.0)
}
