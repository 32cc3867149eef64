use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::git::RepositoryHandle;
use crate::models::{ChangedFileEntry, DiffRecord};
use crate::routes::{blocking, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/commits/{checksum}/files", get(get_changed_files))
        .route("/api/v1/commits/{checksum}/data", get(get_changed_data))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct FilesQuery {
    repo_path: String,
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    repo_path: String,
    file_path: String,
}

async fn get_changed_files(
    Path(checksum): Path<String>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<Vec<ChangedFileEntry>>> {
    let files = blocking(move || RepositoryHandle::open(&query.repo_path)?.changed_files(&checksum)).await?;
    Ok(Json(files))
}

async fn get_changed_data(
    Path(checksum): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Vec<DiffRecord>>> {
    let records = blocking(move || {
        RepositoryHandle::open(&query.repo_path)?.changed_data(&checksum, &query.file_path)
    })
    .await?;
    Ok(Json(records))
}
