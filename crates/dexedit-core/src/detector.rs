use std::collections::HashMap;

use tracing::debug;

use crate::equivalence::{DedupMode, grouping_key};
use crate::models::{DuplicateGroup, DuplicateGroups, GroupMember, Record};

/// Partition `records` into duplicate groups under `mode`.
///
/// Groups appear in order of their key's first occurrence and members keep
/// list order. Keys seen only once are dropped.
pub fn detect(records: &[Record], mode: DedupMode) -> DuplicateGroups {
    let mut buckets: Vec<DuplicateGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (original_index, record) in records.iter().enumerate() {
        let key = grouping_key(record, mode);
        let member = GroupMember {
            original_index,
            record: record.clone(),
        };

        match positions.get(&key) {
            Some(&pos) => buckets[pos].members.push(member),
            None => {
                positions.insert(key.clone(), buckets.len());
                buckets.push(DuplicateGroup {
                    key,
                    members: vec![member],
                });
            }
        }
    }

    buckets.retain(|group| group.len() > 1);
    let groups = DuplicateGroups::from_groups(buckets);

    debug!(
        mode = %mode,
        records = records.len(),
        groups = groups.len(),
        duplicates = groups.total_members(),
        "duplicate detection finished"
    );

    groups
}
