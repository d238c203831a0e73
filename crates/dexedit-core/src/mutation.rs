//! The only primitives that change the canonical list's contents.

use std::collections::BTreeSet;

use tracing::info;

use crate::models::Record;

/// Append `record`, assigning an identity first if it has none.
pub fn append(records: &mut Vec<Record>, mut record: Record) {
    if record.ensure_identity() {
        info!(name = %record.name(), "assigned identity to appended record");
    }
    records.push(record);
}

/// A new list without the elements at `indices`, survivors in their original
/// relative order. Indices past the end are ignored.
pub fn remove_by_index_set(records: &[Record], indices: &BTreeSet<usize>) -> Vec<Record> {
    records
        .iter()
        .enumerate()
        .filter(|(index, _)| !indices.contains(index))
        .map(|(_, record)| record.clone())
        .collect()
}
