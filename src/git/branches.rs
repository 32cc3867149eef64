//! Local branch management and merging into the current checkout.

use git2::build::CheckoutBuilder;
use git2::{
    AnnotatedCommit, Branch, BranchType, Commit, ErrorCode, Index, ObjectType, Oid, Status, StatusOptions,
};

use crate::error::{AppError, Result};
use crate::git::mutations::{entry_path, entry_stage};
use crate::git::repository::RepositoryHandle;
use crate::models::{BranchList, MergeOutcome};

const AUTOMATIC_MERGE_FAILED: &str = "Automatic merge failed; fix conflicts and then commit the result.";

impl RepositoryHandle {
    pub fn list_branches(&self) -> Result<BranchList> {
        let mut branches = Vec::new();
        for item in self.repo().branches(Some(BranchType::Local))? {
            let (branch, _) = item?;
            if let Some(name) = branch.name()? {
                branches.push(name.to_string());
            }
        }
        branches.sort();

        Ok(BranchList {
            current: self.current_branch(),
            branches,
        })
    }

    fn local_branch(&self, name: &str) -> Result<Branch<'_>> {
        match self.repo().find_branch(name, BranchType::Local) {
            Ok(branch) => Ok(branch),
            Err(e) if e.code() == ErrorCode::NotFound || e.code() == ErrorCode::InvalidSpec => {
                Err(AppError::BranchNotFound(name.to_string()))
            }
            Err(e) => Err(AppError::operation(e)),
        }
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.repo().find_branch(name, BranchType::Local).is_ok()
    }

    fn branch_tip(&self, branch: &Branch) -> Result<Commit<'_>> {
        let oid = branch
            .get()
            .target()
            .ok_or_else(|| AppError::OperationFailed("branch has no target".to_string()))?;
        self.repo().find_commit(oid).map_err(AppError::operation)
    }

    /// Creates `name` at HEAD without switching to it.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        validate_branch_name(name)?;
        if self.branch_exists(name) {
            return Err(AppError::AlreadyExists(format!("branch '{}'", name)));
        }
        let head = self
            .head_commit()?
            .ok_or_else(|| AppError::OperationFailed("Not a valid object name: 'HEAD'".to_string()))?;

        self.repo().branch(name, &head, false).map_err(AppError::operation)?;
        tracing::info!("Created branch {} at {}", name, head.id());
        Ok(())
    }

    /// Deletes a local branch that is fully merged into HEAD and not checked out.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self.local_branch(name)?;
        if branch.is_head() {
            return Err(AppError::OperationFailed(format!(
                "Cannot delete branch '{}' checked out at '{}'",
                name,
                self.workdir().display()
            )));
        }

        let tip = self.branch_tip(&branch)?;
        let merged = match self.head_commit()? {
            Some(head) => {
                head.id() == tip.id()
                    || self
                        .repo()
                        .graph_descendant_of(head.id(), tip.id())
                        .map_err(AppError::operation)?
            }
            None => false,
        };
        if !merged {
            return Err(AppError::OperationFailed(format!(
                "The branch '{}' is not fully merged.",
                name
            )));
        }

        branch.delete().map_err(AppError::operation)?;
        tracing::info!("Deleted branch {} (was {})", name, tip.id());
        Ok(())
    }

    pub fn rename_branch(&self, old_name: &str, new_name: &str) -> Result<()> {
        let mut branch = self.local_branch(old_name)?;
        validate_branch_name(new_name)?;
        if self.branch_exists(new_name) {
            return Err(AppError::AlreadyExists(format!("branch '{}'", new_name)));
        }

        branch.rename(new_name, false).map_err(AppError::operation)?;
        tracing::info!("Renamed branch {} to {}", old_name, new_name);
        Ok(())
    }

    /// Switches the working tree to `name`. Local modifications that would be
    /// overwritten make the checkout fail.
    pub fn checkout(&self, name: &str) -> Result<()> {
        let branch = self.local_branch(name)?;
        if self.current_branch().as_deref() == Some(name) {
            return Err(AppError::AlreadyOnBranch(name.to_string()));
        }

        let refname = branch
            .get()
            .name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("refs/heads/{}", name));
        let target = branch.get().peel(ObjectType::Commit).map_err(AppError::operation)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo()
            .checkout_tree(&target, Some(&mut checkout))
            .map_err(AppError::operation)?;
        self.repo().set_head(&refname).map_err(AppError::operation)?;

        tracing::info!("Switched to branch {}", name);
        Ok(())
    }

    /// Tracked files differ from HEAD or the index; untracked files are ignored.
    fn has_uncommitted_changes(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false);
        opts.include_ignored(false);
        opts.exclude_submodules(true);

        let statuses = self.repo().statuses(Some(&mut opts)).map_err(AppError::operation)?;
        Ok(statuses
            .iter()
            .any(|e| !e.status().is_empty() && !e.status().contains(Status::IGNORED)))
    }

    /// Merges `name` into the current checkout.
    ///
    /// A conflicting merge is always rolled back: the conflicted paths are
    /// collected, the working tree and index are restored to HEAD and the
    /// merge state is cleared before `MergeConflict` is returned. Any other
    /// failure after the merge has started is rolled back the same way.
    pub fn merge(&self, name: &str) -> Result<MergeOutcome> {
        let branch = self.local_branch(name)?;
        if self.has_uncommitted_changes()? {
            return Err(AppError::DirtyWorkingTree);
        }

        let theirs = self
            .repo()
            .reference_to_annotated_commit(branch.get())
            .map_err(AppError::operation)?;
        let (analysis, _) = self
            .repo()
            .merge_analysis(&[&theirs])
            .map_err(AppError::operation)?;

        if analysis.is_up_to_date() {
            tracing::info!("Merge of {}: already up to date", name);
            return Ok(MergeOutcome::UpToDate);
        }

        if analysis.is_fast_forward() || analysis.is_unborn() {
            let checksum = self.fast_forward(name, &theirs, analysis.is_unborn())?;
            return Ok(MergeOutcome::FastForward { checksum });
        }

        let checksum = self.merge_commit(name, &theirs)?;
        Ok(MergeOutcome::Merged { checksum })
    }

    fn fast_forward(&self, name: &str, theirs: &AnnotatedCommit, unborn: bool) -> Result<String> {
        let oid = theirs.id();
        let reflog = format!("merge {}: Fast-forward", name);
        let target = self.repo().find_object(oid, None).map_err(AppError::operation)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo()
            .checkout_tree(&target, Some(&mut checkout))
            .map_err(AppError::operation)?;

        if unborn {
            let head = self.repo().find_reference("HEAD").map_err(AppError::operation)?;
            let refname = head
                .symbolic_target()
                .ok_or_else(|| AppError::OperationFailed("HEAD is not symbolic".to_string()))?
                .to_string();
            self.repo()
                .reference(&refname, oid, true, &reflog)
                .map_err(AppError::operation)?;
        } else {
            let mut head = self.repo().head().map_err(AppError::operation)?;
            if head.is_branch() {
                head.set_target(oid, &reflog).map_err(AppError::operation)?;
            } else {
                self.repo().set_head_detached(oid).map_err(AppError::operation)?;
            }
        }

        tracing::info!("Fast-forwarded to {} ({})", name, oid);
        Ok(oid.to_string())
    }

    fn merge_commit(&self, name: &str, theirs: &AnnotatedCommit) -> Result<String> {
        let attempt = self.repo().merge(&[theirs], None, None);

        let mut index = self.repo().index().map_err(AppError::operation)?;
        if attempt.is_err() || index.has_conflicts() {
            let mut paths: Vec<String> = index
                .iter()
                .filter(|e| entry_stage(e) != 0)
                .map(|e| entry_path(&e))
                .collect();
            paths.sort();
            paths.dedup();

            let message = match attempt {
                Err(e) => e.message().to_string(),
                Ok(()) => AUTOMATIC_MERGE_FAILED.to_string(),
            };
            self.abort_merge()?;
            tracing::warn!("Merge of {} aborted, conflicts in {:?}", name, paths);
            return Err(AppError::MergeConflict { message, paths });
        }

        let oid = match self.record_merge(name, theirs, &mut index) {
            Ok(oid) => oid,
            Err(e) => {
                self.abort_merge()?;
                tracing::warn!("Merge of {} aborted: {}", name, e);
                return Err(e);
            }
        };
        self.repo().cleanup_state().map_err(AppError::operation)?;

        tracing::info!("Merged {} into {} ({})", name, self.current_branch().unwrap_or_default(), oid);
        Ok(oid.to_string())
    }

    /// Commits the merged index with HEAD and `theirs` as parents.
    fn record_merge(&self, name: &str, theirs: &AnnotatedCommit, index: &mut Index) -> Result<Oid> {
        let tree_id = index.write_tree().map_err(AppError::operation)?;
        let tree = self.repo().find_tree(tree_id).map_err(AppError::operation)?;
        let signature = self.signature()?;
        let ours = self
            .head_commit()?
            .ok_or_else(|| AppError::OperationFailed("HEAD has no commit".to_string()))?;
        let their_commit = self.repo().find_commit(theirs.id()).map_err(AppError::operation)?;

        let message = format!("Merge branch '{}'", name);
        self.repo()
            .commit(Some("HEAD"), &signature, &signature, &message, &tree, &[&ours, &their_commit])
            .map_err(AppError::operation)
    }

    /// Puts HEAD's tree back into the working tree and index, then clears
    /// the merge state. HEAD itself is left untouched.
    fn abort_merge(&self) -> Result<()> {
        if let Some(head) = self.head_commit()? {
            let tree = head.tree().map_err(AppError::operation)?;
            let mut checkout = CheckoutBuilder::new();
            checkout.force();
            self.repo()
                .checkout_tree(tree.as_object(), Some(&mut checkout))
                .map_err(AppError::operation)?;

            let mut index = self.repo().index().map_err(AppError::operation)?;
            index.read_tree(&tree).map_err(AppError::operation)?;
            index.write().map_err(AppError::operation)?;
        }
        self.repo().cleanup_state().map_err(AppError::operation)
    }
}

fn validate_branch_name(name: &str) -> Result<()> {
    if Branch::name_is_valid(name).unwrap_or(false) {
        Ok(())
    } else {
        Err(AppError::InvalidArgument(format!("'{}' is not a valid branch name", name)))
    }
}
