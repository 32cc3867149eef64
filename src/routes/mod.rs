//! API route handlers - maps HTTP endpoints to git operations.
//!
//! Each submodule defines routes for a feature area:
//! - `filesystem`: Directory listing with per-entry git status
//! - `repository`: Root lookup, staged files, init, clone and commit
//! - `index`: Stage, unstage, discard, untrack, remove and rename
//! - `branches`: Branch listing, creation, deletion, rename, checkout, merge
//! - `commits`: History graph and commit details
//! - `diff`: Files changed by a commit and per-file line content
//! - `navigation`: Per-session "go back" directory stacks
//!
//! Handlers open a fresh repository handle for every request and run the
//! git work on the blocking thread pool.

pub mod branches;
pub mod commits;
pub mod diff;
pub mod filesystem;
pub mod index;
pub mod navigation;
pub mod repository;

use axum::Router;

use crate::error::{AppError, Result};
use crate::navigation::NavigationStacks;

/// Shared across requests. Repository handles are not; only the
/// navigation stacks outlive a request.
#[derive(Clone, Default)]
pub struct AppState {
    pub navigation: NavigationStacks,
}

/// Runs blocking repository work off the async executor.
pub async fn blocking<F, T>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(filesystem::routes(state.clone()))
        .merge(repository::routes(state.clone()))
        .merge(index::routes(state.clone()))
        .merge(branches::routes(state.clone()))
        .merge(commits::routes(state.clone()))
        .merge(diff::routes(state.clone()))
        .merge(navigation::routes(state))
}
