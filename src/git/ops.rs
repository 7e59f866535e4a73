use std::path::Path;

use crate::git::query::{CommitRecord, GitQuery};
use crate::git::runner::{self, CommandResult};

/// Why an operation declined to run. Refusals are policy outcomes, not
/// errors; callers log them and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// Checkout selection outside the displayed history.
    IndexOutOfRange,
    /// Return-to-primary requested while HEAD is attached.
    NotDetached,
    /// Branch name empty after trimming.
    EmptyBranchName,
    /// The primary branch is never deleted.
    PrimaryBranchProtected,
    /// Branch deletion while detached; the caller is put back on the
    /// primary branch instead.
    DetachedHead,
    /// Merge requested while already on the primary branch.
    AlreadyOnPrimary,
    /// No current branch name could be determined.
    NoCurrentBranch,
}

/// Outcome of a mutating operation.
#[derive(Debug, Clone)]
pub enum OpOutcome {
    Done(CommandResult),
    Refused(Refusal),
}

impl OpOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, OpOutcome::Done(_))
    }
}

/// Mutating operations. Each builds a command line, runs it and hands back
/// the captured output; the engine refreshes derived state afterwards.
pub struct GitOps;

impl GitOps {
    /// Check out the commit at `index` in the displayed history. An
    /// out-of-range selection is a silent no-op.
    pub async fn checkout_commit(
        dir: &Path,
        history: &[CommitRecord],
        index: usize,
    ) -> anyhow::Result<OpOutcome> {
        let Some(record) = history.get(index) else {
            return Ok(OpOutcome::Refused(Refusal::IndexOutOfRange));
        };
        let result = runner::run_in(dir, &format!("git checkout {}", record.hash)).await?;
        Ok(OpOutcome::Done(result))
    }

    /// Check out a branch by name.
    pub async fn checkout_branch(dir: &Path, name: &str) -> anyhow::Result<OpOutcome> {
        let name = sanitize_branch_name(name);
        if name.is_empty() {
            return Ok(OpOutcome::Refused(Refusal::EmptyBranchName));
        }
        let result = runner::run_in(dir, &format!("git checkout {}", name)).await?;
        Ok(OpOutcome::Done(result))
    }

    /// Leave a detached HEAD by checking out the primary branch. Only
    /// meaningful while detached; otherwise a no-op.
    pub async fn return_to_primary(dir: &Path, primary: &str) -> anyhow::Result<OpOutcome> {
        if !GitQuery::is_detached_head(dir).await {
            return Ok(OpOutcome::Refused(Refusal::NotDetached));
        }
        let result = runner::run_in(dir, &format!("git checkout {}", primary)).await?;
        Ok(OpOutcome::Done(result))
    }

    /// Create a branch and switch to it. Spaces in the name become hyphens;
    /// an empty name is refused.
    pub async fn create_branch(dir: &Path, name: &str) -> anyhow::Result<OpOutcome> {
        let name = sanitize_branch_name(name);
        if name.is_empty() {
            return Ok(OpOutcome::Refused(Refusal::EmptyBranchName));
        }
        let result = runner::run_in(dir, &format!("git checkout -b {}", name)).await?;
        Ok(OpOutcome::Done(result))
    }

    /// Delete the branch the caller is currently on, landing on the primary
    /// branch. Refuses for the primary branch itself; while detached it
    /// delegates to `return_to_primary` instead of deleting anything.
    pub async fn delete_current_branch(dir: &Path, primary: &str) -> anyhow::Result<OpOutcome> {
        let detached = GitQuery::is_detached_head(dir).await;
        let current = GitQuery::current_branch(dir).await;

        match delete_refusal(&current, primary, detached) {
            Some(Refusal::DetachedHead) => {
                let _ = Self::return_to_primary(dir, primary).await?;
                Ok(OpOutcome::Refused(Refusal::DetachedHead))
            }
            Some(refusal) => Ok(OpOutcome::Refused(refusal)),
            None => {
                let command =
                    format!("git checkout {} && git branch -D {}", primary, current);
                let result = runner::run_in(dir, &command).await?;
                Ok(OpOutcome::Done(result))
            }
        }
    }

    /// User-initiated snapshot: stage everything and commit with the given
    /// message. An empty message falls back to a placeholder rather than
    /// aborting the commit.
    pub async fn commit_snapshot(dir: &Path, message: &str) -> anyhow::Result<OpOutcome> {
        let command = format!(r#"git add . && git commit -m "{}""#, snapshot_message(message));
        let result = runner::run_in(dir, &command).await?;
        Ok(OpOutcome::Done(result))
    }

    /// Merge the current branch into the primary branch, then delete it.
    /// A merge conflict surfaces only as the captured output; the operation
    /// does not roll back.
    pub async fn merge_current_into_primary(
        dir: &Path,
        primary: &str,
    ) -> anyhow::Result<OpOutcome> {
        let current = GitQuery::current_branch(dir).await;

        if let Some(refusal) = merge_refusal(&current, primary) {
            return Ok(OpOutcome::Refused(refusal));
        }

        let command = format!(
            "git checkout {} && git merge {} && git branch -D {}",
            primary, current, current
        );
        let result = runner::run_in(dir, &command).await?;
        Ok(OpOutcome::Done(result))
    }
}

/// Commit message used when a snapshot is taken without one.
const DEFAULT_SNAPSHOT_MESSAGE: &str = "No message attached";

/// The snapshot message actually committed: the user's text, or the
/// placeholder when it is blank.
pub fn snapshot_message(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        DEFAULT_SNAPSHOT_MESSAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Git branch names cannot contain spaces; user input gets them replaced
/// with hyphens.
pub fn sanitize_branch_name(name: &str) -> String {
    name.trim().replace(' ', "-")
}

/// Deletion policy. Protection is an exact-name comparison against the
/// configured primary branch, so a branch merely containing the primary
/// name as a substring is still deletable.
pub fn delete_refusal(current: &str, primary: &str, detached: bool) -> Option<Refusal> {
    if detached {
        return Some(Refusal::DetachedHead);
    }
    if current.is_empty() {
        return Some(Refusal::NoCurrentBranch);
    }
    if current == primary {
        return Some(Refusal::PrimaryBranchProtected);
    }
    None
}

/// Merge policy: an empty current branch is an ambiguous detached state and
/// the primary branch cannot be merged into itself.
pub fn merge_refusal(current: &str, primary: &str) -> Option<Refusal> {
    if current.is_empty() {
        return Some(Refusal::NoCurrentBranch);
    }
    if current == primary {
        return Some(Refusal::AlreadyOnPrimary);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_message_uses_user_text() {
        assert_eq!(snapshot_message("added pads"), "added pads");
        assert_eq!(snapshot_message("  trimmed  "), "trimmed");
    }

    #[test]
    fn test_snapshot_message_blank_gets_placeholder() {
        assert_eq!(snapshot_message(""), "No message attached");
        assert_eq!(snapshot_message("   "), "No message attached");
    }

    #[test]
    fn test_sanitize_branch_name_replaces_spaces() {
        assert_eq!(sanitize_branch_name("feature test"), "feature-test");
        assert_eq!(sanitize_branch_name("  a b c  "), "a-b-c");
        assert_eq!(sanitize_branch_name("plain"), "plain");
    }

    #[test]
    fn test_sanitize_branch_name_empty_stays_empty() {
        assert_eq!(sanitize_branch_name(""), "");
        assert_eq!(sanitize_branch_name("   "), "");
    }

    #[test]
    fn test_delete_refusal_protects_primary_by_exact_name() {
        assert_eq!(
            delete_refusal("master", "master", false),
            Some(Refusal::PrimaryBranchProtected)
        );
        // substring of the primary name is NOT protected
        assert_eq!(delete_refusal("my-master-work", "master", false), None);
        assert_eq!(delete_refusal("master-2", "master", false), None);
    }

    #[test]
    fn test_delete_refusal_detached_wins() {
        assert_eq!(
            delete_refusal("", "master", true),
            Some(Refusal::DetachedHead)
        );
        assert_eq!(
            delete_refusal("feature", "master", true),
            Some(Refusal::DetachedHead)
        );
    }

    #[test]
    fn test_delete_refusal_empty_current() {
        assert_eq!(
            delete_refusal("", "master", false),
            Some(Refusal::NoCurrentBranch)
        );
    }

    #[test]
    fn test_delete_allows_ordinary_branch() {
        assert_eq!(delete_refusal("feature-test", "master", false), None);
    }

    #[test]
    fn test_merge_refusal_cases() {
        assert_eq!(merge_refusal("", "master"), Some(Refusal::NoCurrentBranch));
        assert_eq!(
            merge_refusal("master", "master"),
            Some(Refusal::AlreadyOnPrimary)
        );
        assert_eq!(merge_refusal("feature-test", "master"), None);
        // exact comparison here too
        assert_eq!(merge_refusal("master-fixups", "master"), None);
    }

    #[tokio::test]
    async fn test_checkout_commit_out_of_range_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let history = vec![CommitRecord {
            hash: "abc1234".to_string(),
            rest: "only commit 1 hour ago".to_string(),
        }];
        let outcome = GitOps::checkout_commit(dir.path(), &history, 5).await;
        match outcome {
            Ok(OpOutcome::Refused(Refusal::IndexOutOfRange)) => {}
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_branch_empty_name_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = GitOps::create_branch(dir.path(), "   ").await.unwrap();
        assert!(matches!(
            outcome,
            OpOutcome::Refused(Refusal::EmptyBranchName)
        ));
    }
}
