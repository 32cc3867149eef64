pub mod branches;
pub mod clone;
pub mod diff;
pub mod history;
pub mod listing;
pub mod mutations;
pub mod repository;
pub mod status;

pub use listing::DirectoryLister;
pub use repository::RepositoryHandle;
pub use status::StatusClassifier;

#[cfg(test)]
pub(crate) mod test_support;
