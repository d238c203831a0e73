use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::detector::detect;
use crate::equivalence::DedupMode;
use crate::error::{EditorError, Result};
use crate::models::{DuplicateGroup, DuplicateGroups, Record};
use crate::mutation;
use crate::resolution::{self, Resolution};
use crate::upload;

const DEFAULT_FILE_NAME: &str = "pokemon.json";

/// Whether the grouping reflects the current list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingState {
    Grouped,
    /// The list changed length since the last detection pass.
    Stale,
}

/// A user request against the current duplicate grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveAction {
    RemoveSelected { key: String, indices: BTreeSet<usize> },
    KeepFirst { key: String },
    KeepLast { key: String },
    RemoveAll,
}

/// The editing session: owner of the canonical record list and its grouping.
#[derive(Debug, Clone)]
pub struct Session {
    records: Vec<Record>,
    groups: DuplicateGroups,
    mode: DedupMode,
    state: GroupingState,
    file_name: Option<String>,
    default_file_name: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DedupMode::default())
    }
}

impl Session {
    pub fn new(mode: DedupMode) -> Self {
        Self {
            records: Vec::new(),
            groups: DuplicateGroups::default(),
            mode,
            state: GroupingState::Grouped,
            file_name: None,
            default_file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    /// Start a session from uploaded text.
    pub fn from_upload(text: &str, file_name: Option<&str>, mode: DedupMode) -> Result<Self> {
        let mut session = Self::new(mode);
        session.load_upload(text, file_name)?;
        Ok(session)
    }

    pub fn with_default_file_name(mut self, name: impl Into<String>) -> Self {
        self.default_file_name = name.into();
        self
    }

    // ─── Accessors ─────────────────────────────────────────

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn groups(&self) -> &DuplicateGroups {
        &self.groups
    }

    pub fn mode(&self) -> DedupMode {
        self.mode
    }

    pub fn state(&self) -> GroupingState {
        self.state
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ─── Upload / export ───────────────────────────────────

    /// Replace the list with parsed upload text. On failure nothing changes.
    pub fn load_upload(&mut self, text: &str, file_name: Option<&str>) -> Result<&DuplicateGroups> {
        let records = upload::parse_records(text)?;
        info!(records = records.len(), file = ?file_name, "loaded upload");

        self.records = records;
        self.file_name = file_name.map(ToOwned::to_owned);
        Ok(self.regroup())
    }

    pub fn export_json(&self) -> Result<String> {
        upload::to_pretty_json(&self.records)
    }

    /// Uploaded file name, or the default when nothing was uploaded.
    pub fn export_file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or(&self.default_file_name)
    }

    // ─── Grouping ──────────────────────────────────────────

    /// Recompute the grouping against the current list.
    pub fn regroup(&mut self) -> &DuplicateGroups {
        self.groups = detect(&self.records, self.mode);
        self.state = GroupingState::Grouped;
        &self.groups
    }

    pub fn set_mode(&mut self, mode: DedupMode) -> &DuplicateGroups {
        self.mode = mode;
        self.regroup()
    }

    // ─── Mutation ──────────────────────────────────────────

    /// Append a record (identity assigned if missing) and regroup.
    pub fn append(&mut self, record: Record) -> &DuplicateGroups {
        mutation::append(&mut self.records, record);
        self.regroup()
    }

    /// Remove the record at `index` and regroup. Returns the removed record.
    pub fn remove_at(&mut self, index: usize) -> Result<Record> {
        if index >= self.records.len() {
            return Err(EditorError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        info!(index, name = %removed.name(), "removed record");
        self.regroup();
        Ok(removed)
    }

    /// Raw removal by original index. Leaves the grouping stale; call
    /// [`Session::regroup`] before resolving duplicates again.
    pub fn remove_indices(&mut self, indices: &BTreeSet<usize>) -> usize {
        let before = self.records.len();
        self.records = mutation::remove_by_index_set(&self.records, indices);
        let removed = before - self.records.len();
        if removed > 0 {
            self.state = GroupingState::Stale;
        }
        removed
    }

    /// Apply a duplicate-resolution request. Rejected requests leave the
    /// session untouched. Returns the original indices that were removed.
    pub fn resolve(&mut self, action: &ResolveAction) -> Result<BTreeSet<usize>> {
        if self.state == GroupingState::Stale {
            return Err(EditorError::StaleGrouping);
        }

        let resolution = match action {
            ResolveAction::RemoveSelected { key, indices } => {
                resolution::remove_selected(&self.records, self.group(key)?, indices, self.mode)?
            }
            ResolveAction::KeepFirst { key } => {
                resolution::keep_first(&self.records, self.group(key)?, self.mode)?
            }
            ResolveAction::KeepLast { key } => {
                resolution::keep_last(&self.records, self.group(key)?, self.mode)?
            }
            ResolveAction::RemoveAll => {
                resolution::remove_all_duplicates(&self.records, &self.groups, self.mode)?
            }
        };

        Ok(self.commit(resolution))
    }

    fn group(&self, key: &str) -> Result<&DuplicateGroup> {
        self.groups
            .get(key)
            .ok_or_else(|| EditorError::GroupNotFound(key.to_string()))
    }

    fn commit(&mut self, resolution: Resolution) -> BTreeSet<usize> {
        let Resolution {
            records,
            groups,
            removed,
        } = resolution;
        self.records = records;
        self.groups = groups;
        self.state = GroupingState::Grouped;
        removed
    }
}
