use serde::{Deserialize, Serialize};

/// One node of the history graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitSummary {
    #[serde(rename = "commit_checksum")]
    pub checksum: String,
    pub parent_checksums: Vec<String>,
    #[serde(rename = "commit_message")]
    pub message: String,
    pub author: String,
    pub committer: String,
    pub timestamp: i64,
    pub date: String,
    /// Local branches whose tip can reach this commit
    pub branches: Vec<String>,
}

impl CommitSummary {
    pub fn is_root(&self) -> bool {
        self.parent_checksums.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parent_checksums.len() > 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitCreated {
    pub checksum: String,
}
