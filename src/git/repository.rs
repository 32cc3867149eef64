use git2::{Commit, ErrorCode, Oid, Repository, Signature};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::CommitSummary;
use crate::paths;

const FALLBACK_AUTHOR: &str = "git-workbench";
const FALLBACK_EMAIL: &str = "git-workbench@localhost";

/// A repository opened for the duration of one request.
///
/// Handles are never cached: every request probes the filesystem again, so
/// state changed by other tools is always picked up.
pub struct RepositoryHandle {
    repo: Repository,
    workdir: PathBuf,
}

impl std::fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl RepositoryHandle {
    /// Finds the repository enclosing `path`, searching its ancestors.
    ///
    /// Returns `Ok(None)` when the path is not under version control or only
    /// belongs to a bare repository (which has no working tree to report on).
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        match Repository::discover(path) {
            Ok(repo) => {
                let handle = Self::from_repository(repo, path)?;
                if let Some(ref h) = handle {
                    tracing::debug!("Discovered repository at {}", h.workdir.display());
                }
                Ok(handle)
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(AppError::RepositoryAccess(format!(
                "{}: {}",
                path.display(),
                e.message()
            ))),
        }
    }

    /// Opens the repository rooted exactly at `path`.
    ///
    /// Fails with `PathNotFound` when `path` is not an existing directory and
    /// with `InvalidRepository` when it is not a repository root.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if !path.is_dir() {
            return Err(AppError::PathNotFound(path_str));
        }

        let repo = Repository::open(path).map_err(|_| AppError::InvalidRepository(path_str.clone()))?;
        Self::from_repository(repo, path)?.ok_or(AppError::InvalidRepository(path_str))
    }

    /// Creates a repository at `path` and seals it with an empty commit so
    /// HEAD resolves immediately.
    pub fn initialize<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = paths::resolve_absolute(path.as_ref())
            .map_err(|e| AppError::InvalidArgument(format!("{}: {}", path.as_ref().display(), e)))?;
        if paths::is_filesystem_root(&path) {
            return Err(AppError::InvalidArgument(
                "Cannot initialize repository in root directory".to_string(),
            ));
        }

        let repo = Repository::init(&path).map_err(AppError::operation)?;
        let handle = Self::from_repository(repo, &path)?
            .ok_or_else(|| AppError::OperationFailed(format!("{} has no working tree", path.display())))?;
        handle.commit_index("Initial commit")?;

        tracing::info!("Initialized repository at {}", handle.workdir.display());
        Ok(handle)
    }

    fn from_repository(repo: Repository, probed: &Path) -> Result<Option<Self>> {
        let Some(workdir) = repo.workdir() else {
            tracing::debug!("Ignoring bare repository found from {}", probed.display());
            return Ok(None);
        };
        let workdir = workdir
            .canonicalize()
            .map_err(|e| AppError::RepositoryAccess(format!("{}: {}", workdir.display(), e)))?;
        Ok(Some(Self { repo, workdir }))
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Canonical working-tree root.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Resolves `path` (absolute, or relative to the working tree) to the
    /// `/`-separated form git uses inside the repository.
    pub fn relative_path<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();
        let joined = if path.is_absolute() {
            paths::normalize(path)
        } else {
            paths::normalize(&self.workdir.join(path))
        };
        if let Ok(rel) = joined.strip_prefix(&self.workdir) {
            return Ok(paths::to_slash(rel));
        }

        paths::canonicalize_lenient(&joined)
            .strip_prefix(&self.workdir)
            .map(paths::to_slash)
            .map_err(|_| {
                AppError::RepositoryAccess(format!(
                    "{} is outside the working tree {}",
                    path.display(),
                    self.workdir.display()
                ))
            })
    }

    /// HEAD's commit, or `None` while the current branch is unborn.
    pub fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Short name of the checked-out branch; `None` when HEAD is detached.
    pub fn current_branch(&self) -> Option<String> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => head.shorthand().map(|s| s.to_string()),
            Ok(_) => None,
            // Unborn branch: HEAD still names it symbolically
            Err(_) => self
                .repo
                .find_reference("HEAD")
                .ok()
                .and_then(|r| r.symbolic_target().map(|t| t.trim_start_matches("refs/heads/").to_string())),
        }
    }

    pub fn signature(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => {
                tracing::warn!("No user identity configured, committing as {}", FALLBACK_AUTHOR);
                Signature::now(FALLBACK_AUTHOR, FALLBACK_EMAIL).map_err(AppError::operation)
            }
        }
    }

    /// Commits the current index on top of HEAD (or as a root commit).
    pub fn commit_index(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index().map_err(AppError::operation)?;
        index.read(false).map_err(AppError::operation)?;
        let tree_id = index.write_tree().map_err(AppError::operation)?;
        let tree = self.repo.find_tree(tree_id).map_err(AppError::operation)?;
        let signature = self.signature()?;

        let parent = self.head_commit()?;
        let parents: Vec<&Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(AppError::operation)
    }

    /// Looks up a commit by checksum (full or abbreviated) or any revision.
    pub fn find_commit(&self, checksum: &str) -> Result<Commit<'_>> {
        self.repo
            .revparse_single(checksum)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|_| AppError::CommitNotFound(checksum.to_string()))
    }
}

pub fn commit_to_summary(commit: &Commit, branches: Vec<String>) -> CommitSummary {
    let timestamp = commit.time().seconds();
    CommitSummary {
        checksum: commit.id().to_string(),
        parent_checksums: commit.parent_ids().map(|id| id.to_string()).collect(),
        message: commit.message().unwrap_or("").trim().to_string(),
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        committer: commit.committer().name().unwrap_or("Unknown").to_string(),
        timestamp,
        date: format_timestamp(timestamp),
        branches,
    }
}

/// Formats seconds since the epoch as local `%Y-%m-%d %H:%M:%S`.
pub fn format_timestamp(timestamp: i64) -> String {
    use chrono::{Local, TimeZone};

    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}
