//! Throwaway repositories for unit tests.

use git2::{Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Empty repository with a configured identity.
pub fn init_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    (dir, repo)
}

pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Writes `rel`, stages it and commits on top of HEAD.
pub fn commit_file(repo: &Repository, rel: &str, content: &str, message: &str) -> Oid {
    let root = repo.workdir().unwrap().to_path_buf();
    write_file(&root, rel, content);

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(rel)).unwrap();
    index.write().unwrap();
    commit_index(repo, message)
}

pub fn commit_index(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Name of the branch HEAD points at (`master` or `main` depending on config).
pub fn head_branch(repo: &Repository) -> String {
    repo.head().unwrap().shorthand().unwrap().to_string()
}

pub fn checkout(repo: &Repository, branch: &str) {
    let refname = format!("refs/heads/{}", branch);
    let obj = repo.revparse_single(&refname).unwrap();
    repo.checkout_tree(&obj, Some(git2::build::CheckoutBuilder::new().force()))
        .unwrap();
    repo.set_head(&refname).unwrap();
}
