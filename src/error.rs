//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` for every failure the core can report and implements
//! Axum's `IntoResponse` so handlers can return them directly as JSON error
//! bodies.
//!
//! Error mappings:
//! - `PathNotFound`, `BranchNotFound`, `CommitNotFound`, `FileNotInCommit` → 404
//! - `InvalidRepository`, `InvalidArgument`, `AlreadyExists`,
//!   `AlreadyOnBranch`, `DirtyWorkingTree` → 400
//! - `MergeConflict` → 409 (body carries the conflicting paths)
//! - `OperationFailed`, `Listing`, `RepositoryAccess`, `Git`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("File not found in the commit: {0}")]
    FileNotInCommit(String),

    #[error("Not a valid git repository: {0}")]
    InvalidRepository(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Already on {0}")]
    AlreadyOnBranch(String),

    #[error("Uncommitted changes exist")]
    DirtyWorkingTree,

    #[error("Merge failed: {message}")]
    MergeConflict { message: String, paths: Vec<String> },

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Listing failed: {0}")]
    Listing(String),

    #[error("Repository access failed: {0}")]
    RepositoryAccess(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a backend failure raised while mutating a repository.
    pub fn operation(err: git2::Error) -> Self {
        AppError::OperationFailed(err.message().to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::PathNotFound(_)
            | AppError::BranchNotFound(_)
            | AppError::CommitNotFound(_)
            | AppError::FileNotInCommit(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRepository(_)
            | AppError::InvalidArgument(_)
            | AppError::AlreadyExists(_)
            | AppError::AlreadyOnBranch(_)
            | AppError::DirtyWorkingTree => StatusCode::BAD_REQUEST,
            AppError::MergeConflict { .. } => StatusCode::CONFLICT,
            AppError::Git(_)
            | AppError::OperationFailed(_)
            | AppError::Listing(_)
            | AppError::RepositoryAccess(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::MergeConflict { paths, .. } => Json(json!({
                "error": self.to_string(),
                "conflicts": paths,
            })),
            _ => Json(json!({
                "error": self.to_string(),
            })),
        };

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        for err in [
            AppError::PathNotFound("/nope".into()),
            AppError::BranchNotFound("feature".into()),
            AppError::CommitNotFound("abc123".into()),
            AppError::FileNotInCommit("a.txt".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn caller_mistakes_map_to_400() {
        assert_eq!(AppError::DirtyWorkingTree.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::AlreadyOnBranch("main".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AlreadyExists("feature".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn operation_keeps_backend_message() {
        let err = AppError::operation(git2::Error::from_str("index is locked"));
        assert_eq!(err.to_string(), "Operation failed: index is locked");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
