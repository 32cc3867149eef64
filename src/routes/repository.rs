//! Repository-level endpoints.
//!
//! - GET /api/v1/repository/root?path=
//!   Working-tree root of the repository enclosing `path` (ancestors are
//!   searched).
//!
//! - GET /api/v1/repository/staged?repo_path=
//!   Files staged for the next commit.
//!   Used by: commit dialog
//!
//! - POST /api/v1/repository/init { path }
//!   Creates a repository sealed with an empty "Initial commit".
//!
//! - POST /api/v1/repository/clone { url, path, username?, access_token? }
//!
//! - POST /api/v1/repository/commit { repo_path, message, file_paths }
//!   Stages each path in order and commits; returns the new checksum.

use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::git::clone::{clone_repository, CloneCredentials};
use crate::git::RepositoryHandle;
use crate::models::{Acknowledgement, CommitCreated, DirectoryEntry, RepositoryRoot};
use crate::routes::{blocking, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/repository/root", get(repository_root))
        .route("/api/v1/repository/staged", get(staged_files))
        .route("/api/v1/repository/init", post(init_repository))
        .route("/api/v1/repository/clone", post(clone_repo))
        .route("/api/v1/repository/commit", post(commit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PathParams {
    path: String,
}

#[derive(Debug, Deserialize)]
struct RepoParams {
    repo_path: String,
}

async fn repository_root(Query(params): Query<PathParams>) -> Result<Json<RepositoryRoot>> {
    let root = blocking(move || {
        if !Path::new(&params.path).exists() {
            return Err(AppError::PathNotFound(params.path));
        }
        match RepositoryHandle::discover(&params.path)? {
            Some(handle) => Ok(handle.workdir().to_string_lossy().to_string()),
            None => Err(AppError::InvalidRepository(params.path)),
        }
    })
    .await?;

    Ok(Json(RepositoryRoot { git_root_path: root }))
}

async fn staged_files(Query(params): Query<RepoParams>) -> Result<Json<Vec<DirectoryEntry>>> {
    let entries = blocking(move || RepositoryHandle::open(&params.repo_path)?.staged_files()).await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
struct InitRequest {
    path: String,
}

async fn init_repository(Json(request): Json<InitRequest>) -> Result<Json<Acknowledgement>> {
    let workdir = blocking(move || {
        let handle = RepositoryHandle::initialize(&request.path)?;
        Ok(handle.workdir().to_string_lossy().to_string())
    })
    .await?;

    Ok(Json(Acknowledgement::new(format!(
        "Initialized empty Git repository in {}",
        workdir
    ))))
}

#[derive(Debug, Deserialize)]
struct CloneRequest {
    url: String,
    path: String,
    username: Option<String>,
    access_token: Option<String>,
}

async fn clone_repo(Json(request): Json<CloneRequest>) -> Result<Json<Acknowledgement>> {
    let credentials = match (request.username, request.access_token) {
        (Some(username), Some(access_token)) => Some(CloneCredentials { username, access_token }),
        _ => None,
    };
    let url = request.url;
    let path = request.path;

    let workdir = blocking(move || {
        let handle = clone_repository(&url, &path, credentials.as_ref())?;
        Ok(handle.workdir().to_string_lossy().to_string())
    })
    .await?;

    Ok(Json(Acknowledgement::new(format!("Cloned into {}", workdir))))
}

#[derive(Debug, Deserialize)]
struct CommitRequest {
    repo_path: String,
    message: String,
    #[serde(default)]
    file_paths: Vec<String>,
}

async fn commit(Json(request): Json<CommitRequest>) -> Result<Json<CommitCreated>> {
    let oid = blocking(move || {
        RepositoryHandle::open(&request.repo_path)?.commit(&request.file_paths, &request.message)
    })
    .await?;

    Ok(Json(CommitCreated { checksum: oid.to_string() }))
}
