use std::collections::BTreeSet;

use serde::Serialize;

use super::Record;

/// A record tagged with the position it held in the canonical list when the
/// grouping was computed. The index is stale once the list changes length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMember {
    pub original_index: usize,
    pub record: Record,
}

/// Two or more records sharing a grouping key, in list order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    pub members: Vec<GroupMember>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn first(&self) -> Option<&GroupMember> {
        self.members.first()
    }

    pub fn last(&self) -> Option<&GroupMember> {
        self.members.last()
    }

    /// Original indices of every member, in group order.
    pub fn indices(&self) -> Vec<usize> {
        self.members.iter().map(|m| m.original_index).collect()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.members.iter().any(|m| m.original_index == index)
    }
}

/// Result of a detection pass: groups keyed by grouping key, ordered by the
/// first occurrence of each key in the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DuplicateGroups {
    groups: Vec<DuplicateGroup>,
}

impl DuplicateGroups {
    pub(crate) fn from_groups(groups: Vec<DuplicateGroup>) -> Self {
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateGroup> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Every original index that belongs to some group.
    pub fn grouped_indices(&self) -> BTreeSet<usize> {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.original_index))
            .collect()
    }

    /// Number of records across all groups.
    pub fn total_members(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }
}

impl<'a> IntoIterator for &'a DuplicateGroups {
    type Item = &'a DuplicateGroup;
    type IntoIter = std::slice::Iter<'a, DuplicateGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
