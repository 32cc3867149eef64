//! Directory browsing.
//!
//! - GET /api/v1/filesystem/list?path=
//!   Lists one directory level: folders first, then files, each annotated
//!   with its git status. A `..` entry (key 0) links to the parent unless
//!   the directory is the filesystem root. Defaults to the server's working
//!   directory.
//!   Used by: FileTable

use axum::{
    extract::Query,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::Result;
use crate::git::DirectoryLister;
use crate::models::DirectoryEntry;
use crate::routes::{blocking, AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/filesystem/list", get(list_directory))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    path: Option<String>,
}

async fn list_directory(Query(params): Query<ListParams>) -> Result<Json<Vec<DirectoryEntry>>> {
    let path = params.path.unwrap_or_else(|| ".".to_string());
    let entries = blocking(move || DirectoryLister::new().list(&path)).await?;
    Ok(Json(entries))
}
