//! Index and working-tree mutations.
//!
//! Every operation runs against a handle opened at the repository root.
//! Backend failures are reported as `OperationFailed` with libgit2's message.

use git2::build::CheckoutBuilder;
use git2::{Index, IndexAddOption, IndexEntry, Oid};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::repository::RepositoryHandle;
use crate::git::status::StatusSets;

const REMOVE_COMMIT_MESSAGE: &str = "Remove file from index";

pub(crate) fn entry_stage(entry: &IndexEntry) -> u16 {
    (entry.flags >> 12) & 0x3
}

pub(crate) fn entry_path(entry: &IndexEntry) -> String {
    String::from_utf8_lossy(&entry.path).to_string()
}

/// True when `path` equals `rel` or lies below it.
fn covers(rel: &str, path: &str) -> bool {
    rel.is_empty()
        || path == rel
        || (path.len() > rel.len() && path.starts_with(rel) && path.as_bytes()[rel.len()] == b'/')
}

/// Index paths equal to or below `rel`, each listed once.
fn indexed_paths(index: &Index, rel: &str) -> Vec<String> {
    let mut paths: Vec<String> = index
        .iter()
        .map(|e| entry_path(&e))
        .filter(|p| covers(rel, p))
        .collect();
    paths.dedup();
    paths
}

fn unmatched(path: &str) -> AppError {
    AppError::OperationFailed(format!("pathspec '{}' did not match any files", path))
}

impl RepositoryHandle {
    /// The repository index, reloaded if another process changed it on disk.
    fn index(&self) -> Result<Index> {
        let mut index = self.repo().index().map_err(AppError::operation)?;
        index.read(false).map_err(AppError::operation)?;
        Ok(index)
    }

    /// Adds a file or directory to the index. A path that was deleted from
    /// the working tree stages the deletion.
    pub fn stage(&self, path: &str) -> Result<()> {
        let rel = self.relative_path(path)?;
        let abs = self.workdir().join(&rel);
        let mut index = self.index()?;

        if abs.is_dir() {
            let pathspec = if rel.is_empty() { "*" } else { rel.as_str() };
            index
                .add_all([pathspec], IndexAddOption::DEFAULT, None)
                .map_err(AppError::operation)?;
            index.update_all([pathspec], None).map_err(AppError::operation)?;
        } else if abs.symlink_metadata().is_ok() {
            index.add_path(Path::new(&rel)).map_err(AppError::operation)?;
        } else {
            let tracked = indexed_paths(&index, &rel);
            if tracked.is_empty() {
                return Err(unmatched(path));
            }
            for p in &tracked {
                index.remove_path(Path::new(p)).map_err(AppError::operation)?;
            }
        }

        index.write().map_err(AppError::operation)?;
        tracing::info!("Staged {} in {}", rel, self.workdir().display());
        Ok(())
    }

    /// Resets the index entry for `path` to HEAD, leaving the working tree as
    /// it is. Before the first commit this drops the entry from the index.
    pub fn unstage(&self, path: &str) -> Result<()> {
        let rel = self.relative_path(path)?;
        let pathspec = if rel.is_empty() { "*" } else { rel.as_str() };

        let head = self.head_commit()?;
        self.repo()
            .reset_default(head.as_ref().map(|c| c.as_object()), [pathspec])
            .map_err(AppError::operation)?;

        tracing::info!("Unstaged {} in {}", rel, self.workdir().display());
        Ok(())
    }

    /// Overwrites working-tree content with the index version.
    pub fn discard(&self, path: &str) -> Result<()> {
        let rel = self.relative_path(path)?;
        if indexed_paths(&self.index()?, &rel).is_empty() {
            return Err(unmatched(path));
        }

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        if !rel.is_empty() {
            checkout.path(rel.as_str());
        }
        self.repo()
            .checkout_index(None, Some(&mut checkout))
            .map_err(AppError::operation)?;

        tracing::info!("Discarded changes to {} in {}", rel, self.workdir().display());
        Ok(())
    }

    /// Removes `path` from the index and keeps it on disk.
    pub fn untrack(&self, path: &str) -> Result<()> {
        let rel = self.relative_path(path)?;
        let mut index = self.index()?;
        let tracked = indexed_paths(&index, &rel);
        if tracked.is_empty() {
            return Err(unmatched(path));
        }

        for p in &tracked {
            index.remove_path(Path::new(p)).map_err(AppError::operation)?;
        }
        index.write().map_err(AppError::operation)?;

        tracing::info!("Untracked {} in {}", rel, self.workdir().display());
        Ok(())
    }

    /// Removes `path` from the index and the working tree, then commits the
    /// removal. Refuses when any covered file has staged or unstaged changes
    /// that would be lost.
    pub fn remove(&self, path: &str) -> Result<Oid> {
        let rel = self.relative_path(path)?;
        let mut index = self.index()?;
        let tracked = indexed_paths(&index, &rel);
        if tracked.is_empty() {
            return Err(unmatched(path));
        }
        self.ensure_unchanged(&tracked)?;

        for p in &tracked {
            let file = self.workdir().join(p);
            match fs::remove_file(&file) {
                Ok(()) => self.prune_empty_parents(&file),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(AppError::OperationFailed(format!("{}: {}", file.display(), e))),
            }
        }

        for p in &tracked {
            index.remove_path(Path::new(p)).map_err(AppError::operation)?;
        }
        index.write().map_err(AppError::operation)?;

        let oid = self.commit_index(REMOVE_COMMIT_MESSAGE)?;
        tracing::info!("Removed {} in {} ({})", rel, self.workdir().display(), oid);
        Ok(oid)
    }

    /// Fails on the first path whose index or working-tree content differs
    /// from HEAD. Files already deleted from disk pass.
    fn ensure_unchanged(&self, tracked: &[String]) -> Result<()> {
        let sets = StatusSets::collect(self)?;
        for p in tracked {
            if sets.staged.contains(p) {
                return Err(AppError::OperationFailed(format!(
                    "'{}' has changes staged in the index",
                    p
                )));
            }
            if sets.modified.contains(p) && self.workdir().join(p).symlink_metadata().is_ok() {
                return Err(AppError::OperationFailed(format!("'{}' has local modifications", p)));
            }
        }
        Ok(())
    }

    fn prune_empty_parents(&self, file: &Path) {
        let mut dir = file.parent();
        while let Some(d) = dir {
            if d == self.workdir() || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }

    /// Moves a tracked file or directory, carrying its index entries (and
    /// any staged content) over to the new path.
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        let old_rel = self.relative_path(old_path)?;
        let new_rel = self.relative_path(new_path)?;
        if old_rel.is_empty() || new_rel.is_empty() {
            return Err(AppError::InvalidArgument("Cannot rename the working tree root".to_string()));
        }

        let mut index = self.index()?;
        let entries: Vec<IndexEntry> = index
            .iter()
            .filter(|e| entry_stage(e) == 0 && covers(&old_rel, &entry_path(e)))
            .collect();
        if entries.is_empty() {
            return Err(unmatched(old_path));
        }

        let old_abs = self.workdir().join(&old_rel);
        let new_abs = self.workdir().join(&new_rel);
        if new_abs.symlink_metadata().is_ok() {
            return Err(AppError::OperationFailed(format!("destination exists: {}", new_rel)));
        }
        if let Some(parent) = new_abs.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::OperationFailed(format!("{}: {}", parent.display(), e)))?;
        }
        fs::rename(&old_abs, &new_abs).map_err(|e| {
            AppError::OperationFailed(format!("renaming {} to {}: {}", old_rel, new_rel, e))
        })?;

        for mut entry in entries {
            let path = entry_path(&entry);
            let moved = format!("{}{}", new_rel, &path[old_rel.len()..]);
            index.remove_path(Path::new(&path)).map_err(AppError::operation)?;

            entry.flags &= !0x0fff;
            entry.flags |= moved.len().min(0x0fff) as u16;
            entry.path = moved.into_bytes();
            index.add(&entry).map_err(AppError::operation)?;
        }
        index.write().map_err(AppError::operation)?;

        tracing::info!("Renamed {} to {} in {}", old_rel, new_rel, self.workdir().display());
        Ok(())
    }

    /// Stages each path in order and commits them. The first staging failure
    /// aborts; paths staged before it stay staged.
    pub fn commit(&self, paths: &[String], message: &str) -> Result<Oid> {
        if message.trim().is_empty() {
            return Err(AppError::InvalidArgument("Commit message must not be empty".to_string()));
        }

        for path in paths {
            self.stage(path)?;
        }

        let oid = self.commit_index(message)?;
        tracing::info!("Committed {} in {}", oid, self.workdir().display());
        Ok(oid)
    }
}
