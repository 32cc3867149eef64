//! Data transfer objects (DTOs) for API responses.
//!
//! These structs are serialized to JSON for frontend consumption.
//! - `filesystem`: DirectoryEntry, EntryKind, VcsStatus for the file table
//! - `commit`: CommitSummary for the history graph, CommitCreated
//! - `diff`: ChangedFileEntry, DiffRecord, ChangeKind for commit inspection
//! - `branch`: BranchList and MergeOutcome
//! - `repository`: RepositoryRoot, Acknowledgement, NavigationView

pub mod branch;
pub mod commit;
pub mod diff;
pub mod filesystem;
pub mod repository;

pub use branch::*;
pub use commit::*;
pub use diff::*;
pub use filesystem::*;
pub use repository::*;
