//! Version-control status of working-tree entries.
//!
//! `StatusSets` snapshots the repository's untracked, staged and modified
//! paths with a single status scan. `StatusClassifier` holds one snapshot
//! for a whole listing and answers per-entry questions from it.

use git2::{Status, StatusOptions};
use std::collections::HashSet;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::error::{AppError, Result};
use crate::git::listing::format_system_time;
use crate::git::repository::RepositoryHandle;
use crate::models::{DirectoryEntry, EntryKind, VcsStatus};
use crate::paths;

const STAGED_FLAGS: Status = Status::INDEX_NEW
    .union(Status::INDEX_MODIFIED)
    .union(Status::INDEX_DELETED)
    .union(Status::INDEX_RENAMED)
    .union(Status::INDEX_TYPECHANGE);

const MODIFIED_FLAGS: Status = Status::WT_MODIFIED
    .union(Status::WT_DELETED)
    .union(Status::WT_RENAMED)
    .union(Status::WT_TYPECHANGE)
    .union(Status::CONFLICTED);

/// Repository-relative paths grouped by state.
#[derive(Debug, Default, Clone)]
pub struct StatusSets {
    pub untracked: HashSet<String>,
    /// Index differs from HEAD
    pub staged: HashSet<String>,
    /// Working tree differs from the index
    pub modified: HashSet<String>,
}

impl StatusSets {
    pub fn collect(handle: &RepositoryHandle) -> Result<Self> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true);
        opts.recurse_untracked_dirs(true);
        opts.include_ignored(false);
        opts.exclude_submodules(true);

        let statuses = handle
            .repo()
            .statuses(Some(&mut opts))
            .map_err(|e| AppError::RepositoryAccess(e.message().to_string()))?;

        let mut sets = StatusSets::default();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            let flags = entry.status();

            if flags.is_wt_new() {
                sets.untracked.insert(path.to_string());
            }
            if flags.intersects(STAGED_FLAGS) {
                sets.staged.insert(path.to_string());
            }
            if flags.intersects(MODIFIED_FLAGS) {
                sets.modified.insert(path.to_string());
            }
        }

        tracing::debug!(
            untracked = sets.untracked.len(),
            staged = sets.staged.len(),
            modified = sets.modified.len(),
            "Collected status sets"
        );
        Ok(sets)
    }

    /// True for untracked files and for anything below an untracked
    /// directory entry (git reports nested repositories as `dir/`).
    pub fn is_untracked(&self, rel: &str) -> bool {
        if self.untracked.contains(rel) {
            return true;
        }
        rel.match_indices('/')
            .any(|(i, _)| self.untracked.contains(&rel[..=i]))
    }

    /// Precedence: untracked > staged > modified > committed.
    pub fn file_status(&self, rel: &str) -> VcsStatus {
        if self.is_untracked(rel) {
            VcsStatus::Untracked
        } else if self.staged.contains(rel) {
            VcsStatus::Staged
        } else if self.modified.contains(rel) {
            VcsStatus::Modified
        } else {
            VcsStatus::Committed
        }
    }
}

pub struct StatusClassifier<'a> {
    handle: Option<&'a RepositoryHandle>,
    sets: StatusSets,
}

impl<'a> StatusClassifier<'a> {
    /// Snapshots the repository status once; `None` classifies everything
    /// as not versioned.
    pub fn new(handle: Option<&'a RepositoryHandle>) -> Result<Self> {
        let sets = match handle {
            Some(h) => StatusSets::collect(h)?,
            None => StatusSets::default(),
        };
        Ok(Self { handle, sets })
    }

    pub fn classify(&self, path: &Path, kind: EntryKind) -> Result<VcsStatus> {
        let Some(handle) = self.handle else {
            return Ok(VcsStatus::NotVersioned);
        };

        match kind {
            EntryKind::ParentLink => Ok(VcsStatus::NotVersioned),
            EntryKind::File => {
                let rel = handle.relative_path(path)?;
                Ok(self.sets.file_status(&rel))
            }
            EntryKind::Directory => self.classify_directory(handle, path),
        }
    }

    /// `untracked` iff every file below `dir` is untracked; empty folders
    /// count as tracked.
    fn classify_directory(&self, handle: &RepositoryHandle, dir: &Path) -> Result<VcsStatus> {
        if dir.file_name().is_some_and(|n| n == ".git") {
            return Ok(VcsStatus::Tracked);
        }

        let dir_rel = handle.relative_path(dir)?;
        if !dir_rel.is_empty() && self.sets.untracked.contains(&format!("{}/", dir_rel)) {
            return Ok(VcsStatus::Untracked);
        }

        let walker = WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_repository_boundary(e));

        let mut files = 0usize;
        for entry in walker {
            let entry = entry.map_err(|e| AppError::RepositoryAccess(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            files += 1;

            let sub = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            let rel = join_rel(&dir_rel, &paths::to_slash(sub));
            if !self.sets.is_untracked(&rel) {
                return Ok(VcsStatus::Tracked);
            }
        }

        if files == 0 {
            Ok(VcsStatus::Tracked)
        } else {
            Ok(VcsStatus::Untracked)
        }
    }
}

fn is_repository_boundary(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && (entry.file_name() == ".git" || entry.path().join(".git").exists())
}

fn join_rel(base: &str, sub: &str) -> String {
    if base.is_empty() {
        sub.to_string()
    } else {
        format!("{}/{}", base, sub)
    }
}

impl RepositoryHandle {
    /// Files staged relative to HEAD that still exist in the working tree.
    pub fn staged_files(&self) -> Result<Vec<DirectoryEntry>> {
        let sets = StatusSets::collect(self)?;

        let mut staged: Vec<&String> = sets.staged.iter().collect();
        staged.sort();

        let mut entries = Vec::new();
        for rel in staged {
            let path = self.workdir().join(rel);
            let Ok(metadata) = std::fs::metadata(&path) else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            entries.push(DirectoryEntry {
                key: entries.len(),
                name: rel.clone(),
                path: path.to_string_lossy().to_string(),
                kind: EntryKind::File,
                status: VcsStatus::Staged,
                size: metadata.len(),
                last_modified: metadata.modified().map(format_system_time).unwrap_or_default(),
            });
        }

        Ok(entries)
    }
}
