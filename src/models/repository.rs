//! Repository-level response bodies.
//!
//! - `RepositoryRoot`: working-tree root found above a directory
//! - `Acknowledgement`: human-readable result of a mutation
//! - `NavigationView`: one session's visited-directory stack

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRoot {
    pub git_root_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NavigationView {
    pub session: String,
    /// Oldest first; the last entry is the top of the stack
    pub entries: Vec<String>,
    /// Entry removed by a pop, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popped: Option<String>,
}
