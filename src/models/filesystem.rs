//! Directory listing DTOs.
//!
//! - `DirectoryEntry`: one row of the file table (ordinal, name, kind, status)
//! - `EntryKind`: file, folder or the synthetic `..` link
//! - `VcsStatus`: version-control state of a file or folder aggregate
//!
//! Used by: FileTable in the frontend, keyed on `key`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub key: usize,
    pub name: String,
    pub path: String,
    #[serde(rename = "file_type")]
    pub kind: EntryKind,
    #[serde(rename = "git_type")]
    pub status: VcsStatus,
    pub size: u64,
    pub last_modified: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntryKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "folder")]
    Directory,
    #[serde(rename = "parent")]
    ParentLink,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VcsStatus {
    /// Not inside a repository working tree
    #[serde(rename = "null")]
    NotVersioned,
    Untracked,
    Staged,
    Modified,
    Committed,
    /// Folder containing at least one file that is not untracked
    Tracked,
}
