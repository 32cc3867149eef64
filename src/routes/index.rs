//! Index (staging area) endpoints. Every body names the repository root and
//! a path that is absolute or relative to it.
//!
//! - POST /api/v1/index/stage    { repo_path, file_path }
//! - POST /api/v1/index/unstage  { repo_path, file_path }  (working tree untouched)
//! - POST /api/v1/index/discard  { repo_path, file_path }  (restore from the index)
//! - POST /api/v1/index/untrack  { repo_path, file_path }  (keep on disk)
//! - POST /api/v1/index/remove   { repo_path, file_path }  (delete and commit)
//! - POST /api/v1/index/rename   { repo_path, old_file_path, new_file_path }

use axum::{routing::post, Json, Router};
use serde::Deserialize;

use crate::error::Result;
use crate::git::RepositoryHandle;
use crate::models::{Acknowledgement, CommitCreated};
use crate::routes::{blocking, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/index/stage", post(stage))
        .route("/api/v1/index/unstage", post(unstage))
        .route("/api/v1/index/discard", post(discard))
        .route("/api/v1/index/untrack", post(untrack))
        .route("/api/v1/index/remove", post(remove))
        .route("/api/v1/index/rename", post(rename))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct FileRequest {
    repo_path: String,
    file_path: String,
}

async fn stage(Json(request): Json<FileRequest>) -> Result<Json<Acknowledgement>> {
    let file_path = request.file_path.clone();
    blocking(move || RepositoryHandle::open(&request.repo_path)?.stage(&request.file_path)).await?;
    Ok(Json(Acknowledgement::new(format!("Staged {}", file_path))))
}

async fn unstage(Json(request): Json<FileRequest>) -> Result<Json<Acknowledgement>> {
    let file_path = request.file_path.clone();
    blocking(move || RepositoryHandle::open(&request.repo_path)?.unstage(&request.file_path)).await?;
    Ok(Json(Acknowledgement::new(format!("Unstaged {}", file_path))))
}

async fn discard(Json(request): Json<FileRequest>) -> Result<Json<Acknowledgement>> {
    let file_path = request.file_path.clone();
    blocking(move || RepositoryHandle::open(&request.repo_path)?.discard(&request.file_path)).await?;
    Ok(Json(Acknowledgement::new(format!("Restored {}", file_path))))
}

async fn untrack(Json(request): Json<FileRequest>) -> Result<Json<Acknowledgement>> {
    let file_path = request.file_path.clone();
    blocking(move || RepositoryHandle::open(&request.repo_path)?.untrack(&request.file_path)).await?;
    Ok(Json(Acknowledgement::new(format!("Untracked {}", file_path))))
}

async fn remove(Json(request): Json<FileRequest>) -> Result<Json<CommitCreated>> {
    let oid = blocking(move || RepositoryHandle::open(&request.repo_path)?.remove(&request.file_path)).await?;
    Ok(Json(CommitCreated { checksum: oid.to_string() }))
}

#[derive(Debug, Deserialize)]
struct RenameRequest {
    repo_path: String,
    old_file_path: String,
    new_file_path: String,
}

async fn rename(Json(request): Json<RenameRequest>) -> Result<Json<Acknowledgement>> {
    let message = format!("Renamed {} to {}", request.old_file_path, request.new_file_path);
    blocking(move || {
        RepositoryHandle::open(&request.repo_path)?.rename(&request.old_file_path, &request.new_file_path)
    })
    .await?;
    Ok(Json(Acknowledgement::new(message)))
}
