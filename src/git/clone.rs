use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, RemoteCallbacks};
use serde::Deserialize;
use std::cell::Cell;

use crate::error::{AppError, Result};
use crate::git::repository::RepositoryHandle;
use crate::paths;

/// HTTPS credentials handed to the transport for a single clone.
#[derive(Debug, Clone, Deserialize)]
pub struct CloneCredentials {
    pub username: String,
    pub access_token: String,
}

/// Clones `url` (a remote URL or a local path) into `destination`.
pub fn clone_repository(
    url: &str,
    destination: &str,
    credentials: Option<&CloneCredentials>,
) -> Result<RepositoryHandle> {
    let target = paths::resolve_absolute(destination)
        .map_err(|e| AppError::InvalidArgument(format!("{}: {}", destination, e)))?;

    let attempts = Cell::new(0u32);
    let mut callbacks = RemoteCallbacks::new();
    if let Some(creds) = credentials {
        callbacks.credentials(|_url, _username_from_url, _allowed| {
            // libgit2 retries the callback for as long as it succeeds
            attempts.set(attempts.get() + 1);
            if attempts.get() > 1 {
                return Err(git2::Error::from_str("authentication failed"));
            }
            Cred::userpass_plaintext(&creds.username, &creds.access_token)
        });
    }

    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks);

    RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, &target)
        .map_err(AppError::operation)?;

    tracing::info!("Cloned {} into {}", url, target.display());
    RepositoryHandle::open(&target)
}
