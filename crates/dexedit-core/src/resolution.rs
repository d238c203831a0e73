//! Removal operations over a duplicate grouping.
//!
//! Every operation is expressed in original-list indices, validates before
//! touching anything, and hands back the surviving list together with a fresh
//! grouping. Nothing here mutates its inputs.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::detector::detect;
use crate::equivalence::DedupMode;
use crate::error::{EditorError, Result};
use crate::models::{DuplicateGroup, DuplicateGroups, Record};
use crate::mutation::remove_by_index_set;

/// State after a successful removal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub records: Vec<Record>,
    pub groups: DuplicateGroups,
    pub removed: BTreeSet<usize>,
}

/// Remove the members of `group` whose original index is in `selected`.
///
/// Rejects an empty selection, a selection covering the whole group, and
/// indices that are not members of the group.
pub fn remove_selected(
    records: &[Record],
    group: &DuplicateGroup,
    selected: &BTreeSet<usize>,
    mode: DedupMode,
) -> Result<Resolution> {
    if selected.is_empty() {
        return Err(EditorError::NothingSelected);
    }
    if let Some(&index) = selected.iter().find(|&&i| !group.contains_index(i)) {
        return Err(EditorError::NotInGroup {
            key: group.key.clone(),
            index,
        });
    }
    if selected.len() >= group.len() {
        return Err(EditorError::EntireGroupSelected(group.key.clone()));
    }

    apply(records, std::slice::from_ref(group), selected.clone(), mode)
}

/// Keep the first member of `group` (list order), remove the rest.
pub fn keep_first(records: &[Record], group: &DuplicateGroup, mode: DedupMode) -> Result<Resolution> {
    let removal: BTreeSet<usize> = group.indices().into_iter().skip(1).collect();
    apply(records, std::slice::from_ref(group), removal, mode)
}

/// Keep the last member of `group` (list order), remove the rest.
pub fn keep_last(records: &[Record], group: &DuplicateGroup, mode: DedupMode) -> Result<Resolution> {
    let mut indices = group.indices();
    indices.pop();
    apply(records, std::slice::from_ref(group), indices.into_iter().collect(), mode)
}

/// Keep the first member of every group and remove all others in one batch.
pub fn remove_all_duplicates(
    records: &[Record],
    groups: &DuplicateGroups,
    mode: DedupMode,
) -> Result<Resolution> {
    let removal: BTreeSet<usize> = groups
        .iter()
        .flat_map(|group| group.indices().into_iter().skip(1))
        .collect();
    let groups: Vec<DuplicateGroup> = groups.iter().cloned().collect();
    apply(records, &groups, removal, mode)
}

fn apply(
    records: &[Record],
    groups: &[DuplicateGroup],
    removal: BTreeSet<usize>,
    mode: DedupMode,
) -> Result<Resolution> {
    ensure_current(records, groups)?;
    if removal.is_empty() {
        return Err(EditorError::NothingSelected);
    }

    let survivors = remove_by_index_set(records, &removal);
    let regrouped = detect(&survivors, mode);

    info!(
        removed = removal.len(),
        before = records.len(),
        after = survivors.len(),
        groups = regrouped.len(),
        "removed duplicate records"
    );

    Ok(Resolution {
        records: survivors,
        groups: regrouped,
        removed: removal,
    })
}

/// Reject groupings whose indices no longer point into `records`.
fn ensure_current(records: &[Record], groups: &[DuplicateGroup]) -> Result<()> {
    let stale = groups
        .iter()
        .flat_map(|g| g.members.iter())
        .any(|m| records.get(m.original_index) != Some(&m.record));
    if stale {
        return Err(EditorError::StaleGrouping);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StatBlock, field};

    fn mon(name: &str, level: i64) -> Record {
        Record::default()
            .with(field::NAME, name)
            .with(field::LEVEL, level)
            .with(field::STATS, StatBlock::uniform(50).to_value())
    }

    fn tagged(name: &str, level: i64, tag: &str) -> Record {
        mon(name, level).with(field::NICKNAME, tag)
    }

    fn names(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.name().into_owned()).collect()
    }

    fn tags(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.nickname().into_owned()).collect()
    }

    fn sample() -> (Vec<Record>, DuplicateGroups) {
        let list = vec![mon("A", 5), mon("A", 5), mon("B", 10), mon("A", 5)];
        let groups = detect(&list, DedupMode::Strict);
        (list, groups)
    }

    #[test]
    fn rejects_empty_selection() {
        let (list, groups) = sample();
        let group = groups.iter().next().unwrap();
        let err = remove_selected(&list, group, &BTreeSet::new(), DedupMode::Strict).unwrap_err();
        assert!(matches!(err, EditorError::NothingSelected));
    }

    #[test]
    fn rejects_whole_group_selection() {
        let (list, groups) = sample();
        let group = groups.iter().next().unwrap();
        let all: BTreeSet<usize> = group.indices().into_iter().collect();
        let err = remove_selected(&list, group, &all, DedupMode::Strict).unwrap_err();
        assert!(matches!(err, EditorError::EntireGroupSelected(_)));
    }

    #[test]
    fn rejects_foreign_indices() {
        let (list, groups) = sample();
        let group = groups.iter().next().unwrap();
        let err =
            remove_selected(&list, group, &BTreeSet::from([2]), DedupMode::Strict).unwrap_err();
        assert!(matches!(err, EditorError::NotInGroup { index: 2, .. }));
    }

    #[test]
    fn remove_selected_shrinks_by_selection_size() {
        let (list, groups) = sample();
        let group = groups.iter().next().unwrap();
        let res = remove_selected(&list, group, &BTreeSet::from([1]), DedupMode::Strict).unwrap();
        assert_eq!(res.records.len(), 3);
        assert_eq!(names(&res.records), vec!["A", "B", "A"]);
        assert_eq!(res.groups.iter().next().unwrap().indices(), vec![0, 2]);
    }

    #[test]
    fn keep_first_and_keep_last_pick_the_survivor() {
        let list = vec![
            tagged("A", 5, "first"),
            mon("A", 5),
            mon("B", 10),
            tagged("A", 5, "last"),
        ];
        let groups = detect(&list, DedupMode::Loose);
        let group = groups.get(r#"["A",5]"#).unwrap();

        let first = keep_first(&list, group, DedupMode::Loose).unwrap();
        assert_eq!(first.records.len(), 2);
        assert_eq!(first.records[0].nickname(), "first");
        assert_eq!(first.removed, BTreeSet::from([1, 3]));

        let last = keep_last(&list, group, DedupMode::Loose).unwrap();
        assert_eq!(last.records.len(), 2);
        assert_eq!(names(&last.records), vec!["B", "A"]);
        assert_eq!(last.records[1].nickname(), "last");
    }

    #[test]
    fn remove_all_keeps_each_groups_first_member_in_place() {
        let list = vec![
            tagged("B", 1, "b0"),
            tagged("A", 5, "a0"),
            tagged("C", 3, "c0"),
            tagged("A", 5, "a1"),
            tagged("B", 1, "b1"),
            tagged("A", 5, "a2"),
            tagged("D", 9, "d0"),
            tagged("B", 1, "b2"),
        ];
        let groups = detect(&list, DedupMode::Loose);
        let firsts: Vec<String> = groups
            .iter()
            .filter_map(DuplicateGroup::first)
            .map(|m| m.record.nickname().into_owned())
            .collect();
        assert_eq!(firsts, vec!["b0", "a0"]);

        let res = remove_all_duplicates(&list, &groups, DedupMode::Loose).unwrap();
        assert_eq!(tags(&res.records), vec!["b0", "a0", "c0", "d0"]);
        assert_eq!(res.removed, BTreeSet::from([3, 4, 5, 7]));
    }

    #[test]
    fn remove_all_keeps_one_per_key() {
        let list = vec![mon("A", 5), mon("B", 1), mon("A", 5), mon("B", 1), mon("C", 3)];
        let groups = detect(&list, DedupMode::Strict);
        let res = remove_all_duplicates(&list, &groups, DedupMode::Strict).unwrap();

        assert_eq!(names(&res.records), vec!["A", "B", "C"]);
        assert!(res.groups.is_empty());
    }

    #[test]
    fn remove_all_without_groups_is_rejected() {
        let list = vec![mon("A", 5)];
        let groups = detect(&list, DedupMode::Strict);
        let err = remove_all_duplicates(&list, &groups, DedupMode::Strict).unwrap_err();
        assert!(matches!(err, EditorError::NothingSelected));
    }

    #[test]
    fn stale_grouping_is_rejected() {
        let (list, groups) = sample();
        let shorter = &list[..2];
        let group = groups.iter().next().unwrap();
        let err = keep_first(shorter, group, DedupMode::Strict).unwrap_err();
        assert!(matches!(err, EditorError::StaleGrouping));
    }
}
