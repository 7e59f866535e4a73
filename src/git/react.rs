use std::path::Path;

use crate::config::Config;
use crate::git::query;
use crate::git::runner;

/// What `react_to_change` did about the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Porcelain status was empty; nothing to do.
    Clean,
    /// Changes were staged and committed with the configured message.
    AutoCommitted,
    /// HEAD was detached with pending changes; a recovery branch now points
    /// at the work.
    RecoveredDetached { branch: String },
}

/// A reaction that actually changed the repository, timestamped for the
/// engine's recent-activity log.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub reaction: Reaction,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl ChangeEvent {
    pub fn new(reaction: Reaction) -> Self {
        ChangeEvent {
            reaction,
            timestamp: chrono::Local::now(),
        }
    }
}

/// Safety net for edits that appear on disk without an explicit commit
/// gesture: the host saves project files on its own schedule, so this runs
/// whenever the working tree may have changed underneath us.
pub struct ChangeReactor;

impl ChangeReactor {
    /// Inspect the working tree and commit or recover as needed.
    ///
    /// Dirty + attached: stage everything and auto-commit. Dirty + detached:
    /// create `<hash>-branch` at the current commit instead of committing,
    /// so work done while detached can never be garbage-collected away.
    pub async fn react_to_change(dir: &Path, config: &Config) -> anyhow::Result<Reaction> {
        let porcelain = runner::run_in(dir, "git status --porcelain").await?;
        if porcelain.output.trim().is_empty() {
            return Ok(Reaction::Clean);
        }

        let status = runner::run_in(dir, "git status").await?;
        if let Some(hash) = query::detached_hash(&status.output) {
            let branch = recovery_branch_name(&hash);
            let result = runner::run_in(dir, &format!("git checkout -b {}", branch)).await?;
            if !result.success {
                anyhow::bail!("Failed to create recovery branch '{}': {}", branch, result.output);
            }
            tracing::info!(branch = %branch, "recovered detached HEAD onto a new branch");
            return Ok(Reaction::RecoveredDetached { branch });
        }

        let add = runner::run_in(dir, "git add .").await?;
        if !add.success {
            anyhow::bail!("Failed to stage changes: {}", add.output);
        }
        let commit = runner::run_in(
            dir,
            &format!(r#"git commit -m "{}""#, config.auto_commit_message),
        )
        .await?;
        if !commit.success {
            anyhow::bail!("Auto commit failed: {}", commit.output);
        }
        tracing::info!("auto-committed working tree changes");
        Ok(Reaction::AutoCommitted)
    }
}

/// Name of the branch that pins a detached commit.
pub fn recovery_branch_name(hash: &str) -> String {
    format!("{}-branch", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_branch_name() {
        assert_eq!(recovery_branch_name("a1b2c3d"), "a1b2c3d-branch");
    }

    #[tokio::test]
    async fn test_clean_tree_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new();

        // Outside a repository the porcelain query fails with empty stdout
        // plus an error line, so only run the assertion inside a real repo.
        let init = runner::run_in(dir.path(), "git init -b master").await;
        if init.is_err() {
            println!("skipping: git unavailable");
            return;
        }

        let reaction = ChangeReactor::react_to_change(dir.path(), &config).await;
        match reaction {
            Ok(Reaction::Clean) => {}
            Ok(other) => panic!("expected Clean, got {:?}", other),
            Err(e) => println!("skipping: {}", e),
        }
    }
}
