//! Commit diff DTOs.
//!
//! - `ChangedFileEntry`: one path touched by a commit, with its change kind
//! - `DiffRecord`: full pre-image and post-image lines for one touched path
//! - `ChangeKind`: added, deleted or modified (renames surface as delete + add)
//!
//! Used by: history view's changed-files list and file comparison pane

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

impl ChangeKind {
    /// Only add/delete/modify are surfaced; renames, copies and type changes
    /// are not classified.
    pub fn from_delta(delta: git2::Delta) -> Option<Self> {
        match delta {
            git2::Delta::Added => Some(ChangeKind::Added),
            git2::Delta::Deleted => Some(ChangeKind::Deleted),
            git2::Delta::Modified => Some(ChangeKind::Modified),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangedFileEntry {
    pub file_name: String,
    pub path: String,
    pub change_type: ChangeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffRecord {
    pub change_type: ChangeKind,
    pub removed_lines: Vec<String>,
    pub added_lines: Vec<String>,
}
