use git2::{Commit, Diff, DiffFile};

use crate::error::{AppError, Result};
use crate::git::repository::RepositoryHandle;
use crate::models::{ChangeKind, ChangedFileEntry, DiffRecord};
use crate::paths;

impl RepositoryHandle {
    /// Diff against the first parent; root commits diff against the empty tree.
    fn first_parent_diff(&self, commit: &Commit) -> Result<Diff<'_>> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        // No rename detection: a move shows up as delete + add
        Ok(self.repo().diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?)
    }

    pub fn changed_files(&self, checksum: &str) -> Result<Vec<ChangedFileEntry>> {
        let commit = self.find_commit(checksum)?;
        let diff = self.first_parent_diff(&commit)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let Some(kind) = ChangeKind::from_delta(delta.status()) else {
                continue;
            };
            let file = match kind {
                ChangeKind::Deleted => delta.old_file(),
                _ => delta.new_file(),
            };
            let Some(path) = file.path() else {
                continue;
            };

            files.push(ChangedFileEntry {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                path: paths::to_slash(path),
                change_type: kind,
            });
        }

        Ok(files)
    }

    /// Before/after lines of every diff entry touching `file_path`, matched on
    /// either side of the delta.
    pub fn changed_data(&self, checksum: &str, file_path: &str) -> Result<Vec<DiffRecord>> {
        let commit = self.find_commit(checksum)?;
        let rel = self.relative_path(file_path)?;
        let diff = self.first_parent_diff(&commit)?;

        let mut records = Vec::new();
        for delta in diff.deltas() {
            let Some(kind) = ChangeKind::from_delta(delta.status()) else {
                continue;
            };
            let touches = |file: &DiffFile| file.path().is_some_and(|p| paths::to_slash(p) == rel);
            if !touches(&delta.old_file()) && !touches(&delta.new_file()) {
                continue;
            }

            records.push(DiffRecord {
                change_type: kind,
                removed_lines: self.blob_lines(&delta.old_file())?,
                added_lines: self.blob_lines(&delta.new_file())?,
            });
        }

        if records.is_empty() {
            return Err(AppError::FileNotInCommit(file_path.to_string()));
        }
        Ok(records)
    }

    fn blob_lines(&self, file: &DiffFile) -> Result<Vec<String>> {
        if file.id().is_zero() {
            return Ok(Vec::new());
        }
        let blob = self.repo().find_blob(file.id())?;
        Ok(String::from_utf8_lossy(blob.content())
            .lines()
            .map(|l| l.to_string())
            .collect())
    }
}
