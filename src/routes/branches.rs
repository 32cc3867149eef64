//! Branch endpoints.
//!
//! - GET /api/v1/branches?repo_path=
//!   Local branches plus the checked-out one (`current` is null when HEAD is
//!   detached).
//!   Used by: BranchSwitcher dropdown in header
//!
//! - POST /api/v1/branches/create   { repo_path, branch_name }
//! - POST /api/v1/branches/delete   { repo_path, branch_name }
//! - POST /api/v1/branches/checkout { repo_path, branch_name }
//! - POST /api/v1/branches/rename   { repo_path, old_name, new_name }
//!
//! - POST /api/v1/branches/merge { repo_path, branch_name }
//!   Merges into the current checkout. Refused with 400 on a dirty tree;
//!   conflicts are rolled back and reported with 409 and the paths.

use axum::{
    extract::Query,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::git::RepositoryHandle;
use crate::models::{Acknowledgement, BranchList, MergeOutcome};
use crate::routes::{blocking, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/branches", get(list_branches))
        .route("/api/v1/branches/create", post(create_branch))
        .route("/api/v1/branches/delete", post(delete_branch))
        .route("/api/v1/branches/checkout", post(checkout_branch))
        .route("/api/v1/branches/rename", post(rename_branch))
        .route("/api/v1/branches/merge", post(merge_branch))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RepoParams {
    repo_path: String,
}

#[derive(Debug, Deserialize)]
struct BranchRequest {
    repo_path: String,
    branch_name: String,
}

async fn list_branches(Query(params): Query<RepoParams>) -> Result<Json<BranchList>> {
    let list = blocking(move || RepositoryHandle::open(&params.repo_path)?.list_branches()).await?;
    Ok(Json(list))
}

async fn create_branch(Json(request): Json<BranchRequest>) -> Result<Json<Acknowledgement>> {
    let message = format!("Created branch '{}'", request.branch_name);
    blocking(move || RepositoryHandle::open(&request.repo_path)?.create_branch(&request.branch_name)).await?;
    Ok(Json(Acknowledgement::new(message)))
}

async fn delete_branch(Json(request): Json<BranchRequest>) -> Result<Json<Acknowledgement>> {
    let message = format!("Deleted branch '{}'", request.branch_name);
    blocking(move || RepositoryHandle::open(&request.repo_path)?.delete_branch(&request.branch_name)).await?;
    Ok(Json(Acknowledgement::new(message)))
}

async fn checkout_branch(Json(request): Json<BranchRequest>) -> Result<Json<Acknowledgement>> {
    let message = format!("Switched to branch '{}'", request.branch_name);
    blocking(move || RepositoryHandle::open(&request.repo_path)?.checkout(&request.branch_name)).await?;
    Ok(Json(Acknowledgement::new(message)))
}

#[derive(Debug, Deserialize)]
struct RenameRequest {
    repo_path: String,
    old_name: String,
    new_name: String,
}

async fn rename_branch(Json(request): Json<RenameRequest>) -> Result<Json<Acknowledgement>> {
    let message = format!("Renamed branch '{}' to '{}'", request.old_name, request.new_name);
    blocking(move || {
        RepositoryHandle::open(&request.repo_path)?.rename_branch(&request.old_name, &request.new_name)
    })
    .await?;
    Ok(Json(Acknowledgement::new(message)))
}

async fn merge_branch(Json(request): Json<BranchRequest>) -> Result<Json<MergeOutcome>> {
    let outcome = blocking(move || RepositoryHandle::open(&request.repo_path)?.merge(&request.branch_name)).await?;
    Ok(Json(outcome))
}
