//! Directory listing annotated with version-control status.

use chrono::{DateTime, Local};
use feruca::Collator;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{AppError, Result};
use crate::git::repository::RepositoryHandle;
use crate::git::status::StatusClassifier;
use crate::models::{DirectoryEntry, EntryKind, VcsStatus};
use crate::paths;

/// Lists one directory level, sorted folders-first then by Unicode
/// collation order.
pub struct DirectoryLister {
    collator: Collator,
}

struct Child {
    name: String,
    path: PathBuf,
    is_dir: bool,
    size: u64,
    modified: Option<SystemTime>,
}

impl Default for DirectoryLister {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryLister {
    pub fn new() -> Self {
        Self {
            collator: Collator::default(),
        }
    }

    pub fn list(&mut self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let dir = resolve_directory(path)?;
        self.list_resolved(&dir).map_err(|e| match e {
            AppError::Listing(_) => e,
            other => AppError::Listing(other.to_string()),
        })
    }

    fn list_resolved(&mut self, dir: &Path) -> Result<Vec<DirectoryEntry>> {
        let mut children = scan(dir).map_err(|e| AppError::Listing(format!("{}: {}", dir.display(), e)))?;

        let collator = &mut self.collator;
        children.sort_by(|a, b| match (a.is_dir, b.is_dir) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => collator.collate(&a.name, &b.name),
        });

        let handle = RepositoryHandle::discover(dir)?;
        let classifier = StatusClassifier::new(handle.as_ref())?;

        let mut entries = Vec::with_capacity(children.len() + 1);
        entries.extend(parent_link(dir));

        for (i, child) in children.into_iter().enumerate() {
            let kind = if child.is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let status = classifier.classify(&child.path, kind)?;

            entries.push(DirectoryEntry {
                key: i + 1,
                name: child.name,
                path: child.path.to_string_lossy().to_string(),
                kind,
                status,
                size: child.size,
                last_modified: child.modified.map(format_system_time).unwrap_or_default(),
            });
        }

        tracing::debug!("Listed {} entries in {}", entries.len(), dir.display());
        Ok(entries)
    }
}

fn resolve_directory(path: &str) -> Result<PathBuf> {
    let absolute = paths::resolve_absolute(path).map_err(|e| AppError::Listing(format!("{}: {}", path, e)))?;

    absolute.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            AppError::PathNotFound(absolute.to_string_lossy().to_string())
        } else {
            AppError::Listing(format!("{}: {}", absolute.display(), e))
        }
    })
}

/// One `read_dir` pass. Symlinks report their target's metadata; dangling
/// ones fall back to the link itself.
fn scan(dir: &Path) -> io::Result<Vec<Child>> {
    let mut children = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(_) => entry.metadata()?,
        };

        children.push(Child {
            name: entry.file_name().to_string_lossy().to_string(),
            path,
            is_dir: metadata.is_dir(),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().ok(),
        });
    }

    Ok(children)
}

fn parent_link(dir: &Path) -> Option<DirectoryEntry> {
    if paths::is_filesystem_root(dir) {
        return None;
    }
    let parent = dir.parent()?;

    Some(DirectoryEntry {
        key: 0,
        name: "..".to_string(),
        path: parent.to_string_lossy().to_string(),
        kind: EntryKind::ParentLink,
        status: VcsStatus::NotVersioned,
        size: 0,
        last_modified: String::new(),
    })
}

pub(crate) fn format_system_time(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}
