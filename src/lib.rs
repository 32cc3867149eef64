//! Backend core of a browser-based git workbench.
//!
//! The `git` module holds the repository logic (status classification,
//! directory listing, mutations, history and diffs); `routes` exposes it over
//! an axum router.

pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod navigation;
pub mod paths;
pub mod routes;

pub use config::ServerConfig;
pub use error::{AppError, Result};
