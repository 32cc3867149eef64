use git2::{Oid, Sort};

use crate::error::Result;
use crate::git::repository::{commit_to_summary, RepositoryHandle};
use crate::models::CommitSummary;

impl RepositoryHandle {
    /// Local branch tips, sorted by branch name.
    fn branch_tips(&self) -> Result<Vec<(String, Oid)>> {
        let mut tips = Vec::new();
        for item in self.repo().branches(Some(git2::BranchType::Local))? {
            let (branch, _) = item?;
            let (Some(name), Some(oid)) = (branch.name()?, branch.get().target()) else {
                continue;
            };
            tips.push((name.to_string(), oid));
        }
        tips.sort();
        Ok(tips)
    }

    /// Branches whose tip is `oid` or descends from it.
    ///
    /// One reachability query per branch, so a full walk costs
    /// commits x branches graph lookups.
    fn containing_branches(&self, tips: &[(String, Oid)], oid: Oid) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for (name, tip) in tips {
            if *tip == oid || self.repo().graph_descendant_of(*tip, oid)? {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    /// Every commit reachable from HEAD or a local branch, newest first and
    /// each listed once.
    pub fn history(&self) -> Result<Vec<CommitSummary>> {
        let tips = self.branch_tips()?;

        let mut revwalk = self.repo().revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        if let Some(head) = self.head_commit()? {
            revwalk.push(head.id())?;
        }
        for (_, tip) in &tips {
            revwalk.push(*tip)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo().find_commit(oid)?;
            let branches = self.containing_branches(&tips, oid)?;
            commits.push(commit_to_summary(&commit, branches));
        }

        tracing::debug!(
            "Walked {} commits across {} branches in {}",
            commits.len(),
            tips.len(),
            self.workdir().display()
        );
        Ok(commits)
    }

    pub fn resolve_commit(&self, checksum: &str) -> Result<CommitSummary> {
        let commit = self.find_commit(checksum)?;
        let tips = self.branch_tips()?;
        let branches = self.containing_branches(&tips, commit.id())?;
        Ok(commit_to_summary(&commit, branches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::git::test_support::{checkout, commit_file, head_branch, init_repo};

    #[test]
    fn empty_repository_has_no_history() {
        let (dir, _repo) = init_repo();
        let handle = RepositoryHandle::open(dir.path()).unwrap();
        assert!(handle.history().unwrap().is_empty());
    }

    #[test]
    fn linear_history_is_newest_first() {
        let (dir, repo) = init_repo();
        let c0 = commit_file(&repo, "a.txt", "1\n", "first");
        let c1 = commit_file(&repo, "a.txt", "2\n", "second");
        let c2 = commit_file(&repo, "a.txt", "3\n", "third");
        let handle = RepositoryHandle::open(dir.path()).unwrap();

        let history = handle.history().unwrap();
        let ids: Vec<&str> = history.iter().map(|c| c.checksum.as_str()).collect();
        assert_eq!(ids, vec![c2.to_string(), c1.to_string(), c0.to_string()]);

        assert!(history[2].is_root());
        assert_eq!(history[0].parent_checksums, vec![c1.to_string()]);
        assert_eq!(history[0].message, "third");
        assert_eq!(history[0].author, "Test User");
    }

    #[test]
    fn branch_membership_follows_reachability() {
        let (dir, repo) = init_repo();
        let base = commit_file(&repo, "a.txt", "a\n", "base");
        let main = head_branch(&repo);
        let commit = repo.find_commit(base).unwrap();
        repo.branch("feature", &commit, false).unwrap();
        checkout(&repo, "feature");
        let ahead = commit_file(&repo, "b.txt", "b\n", "feature only");
        checkout(&repo, &main);

        let handle = RepositoryHandle::open(dir.path()).unwrap();
        let history = handle.history().unwrap();
        assert_eq!(history.len(), 2);

        let by_id = |oid: Oid| history.iter().find(|c| c.checksum == oid.to_string()).unwrap();
        assert_eq!(by_id(ahead).branches, vec!["feature".to_string()]);
        let mut expected = vec!["feature".to_string(), main];
        expected.sort();
        assert_eq!(by_id(base).branches, expected);
    }

    #[test]
    fn merge_commits_list_both_parents() {
        let (dir, repo) = init_repo();
        commit_file(&repo, "shared.txt", "s\n", "base");
        let main = head_branch(&repo);
        let handle = RepositoryHandle::open(dir.path()).unwrap();
        handle.create_branch("topic").unwrap();
        checkout(&repo, "topic");
        let theirs = commit_file(&repo, "topic.txt", "t\n", "topic");
        checkout(&repo, &main);
        let ours = commit_file(&repo, "main.txt", "m\n", "main");
        handle.merge("topic").unwrap();

        let history = handle.history().unwrap();
        assert!(history[0].is_merge());
        assert_eq!(history[0].parent_checksums, vec![ours.to_string(), theirs.to_string()]);
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn resolve_commit_reports_details() {
        let (dir, repo) = init_repo();
        let oid = commit_file(&repo, "a.txt", "a\n", "Describe change\n\nLonger body");
        let handle = RepositoryHandle::open(dir.path()).unwrap();

        let summary = handle.resolve_commit(&oid.to_string()[..10]).unwrap();
        assert_eq!(summary.checksum, oid.to_string());
        assert_eq!(summary.message, "Describe change\n\nLonger body");
        assert_eq!(summary.committer, "Test User");
        assert_eq!(summary.branches, vec![head_branch(&repo)]);
        assert_eq!(summary.date.len(), "2024-01-01 00:00:00".len());

        assert!(matches!(
            handle.resolve_commit("0123456789abcdef0123").unwrap_err(),
            AppError::CommitNotFound(_)
        ));
    }
}
