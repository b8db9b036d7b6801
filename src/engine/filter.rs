//! Free-text query over the flat record set.

use crate::core::CheckRecord;

/// True when any searchable field contains `needle` (already lowercased).
#[inline]
pub fn matches_query(record: &CheckRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    [
        record.category.as_str(),
        record.server_name.as_str(),
        record.target(),
        record.check_type.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Records matching `query`, case-insensitively, in input order.
///
/// Runs once on the flat set before grouping, so groups without a single
/// match disappear and matches never pull in unrelated siblings.
pub fn filter_records<'a>(records: &'a [CheckRecord], query: &str) -> Vec<&'a CheckRecord> {
    let needle = query.to_lowercase();
    records.iter().filter(|r| matches_query(r, &needle)).collect()
}
