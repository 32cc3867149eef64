use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::git::RepositoryHandle;
use crate::models::CommitSummary;
use crate::routes::{blocking, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/history", get(get_history))
        .route("/api/v1/commits/{checksum}", get(get_commit))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RepoParams {
    repo_path: String,
}

async fn get_history(Query(params): Query<RepoParams>) -> Result<Json<Vec<CommitSummary>>> {
    let commits = blocking(move || RepositoryHandle::open(&params.repo_path)?.history()).await?;
    Ok(Json(commits))
}

async fn get_commit(
    Path(checksum): Path<String>,
    Query(params): Query<RepoParams>,
) -> Result<Json<CommitSummary>> {
    let summary =
        blocking(move || RepositoryHandle::open(&params.repo_path)?.resolve_commit(&checksum)).await?;
    Ok(Json(summary))
}
