use std::path::Path;

use crate::git::runner;

/// Marker git prints in `git status` when the checkout points at a commit
/// instead of a branch.
pub const DETACHED_MARKER: &str = "HEAD detached at";

/// One entry of the commit history, most-recent-first.
///
/// `rest` is everything after the first space of the log line: the subject
/// with the relative age still appended. The display layer shows it as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub rest: String,
}

/// One raw line of `git branch` output. The leading marker and padding stay
/// in `raw` for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    pub raw: String,
    pub is_current: bool,
}

impl BranchRecord {
    /// Branch name without the current-branch marker and padding.
    pub fn name(&self) -> &str {
        self.raw.trim_start_matches('*').trim()
    }
}

/// Derived working-tree state, recomputed on every query so it can never go
/// stale across mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryState {
    AttachedClean,
    AttachedDirty,
    DetachedClean(String),
    DetachedDirty(String),
}

/// Read-only queries against the bound repository. Every function degrades
/// to an empty result when the subprocess fails or the directory is not a
/// repository.
pub struct GitQuery;

impl GitQuery {
    /// Commit history as `git log` emits it, newest first.
    pub async fn commit_history(dir: &Path) -> Vec<CommitRecord> {
        match runner::run_in(dir, r#"git log --pretty=format:"%h %s %cr""#).await {
            Ok(result) if result.success => parse_commit_lines(&result.output),
            _ => Vec::new(),
        }
    }

    /// Raw `git branch` lines in emission order.
    pub async fn branches(dir: &Path) -> Vec<BranchRecord> {
        match runner::run_in(dir, "git branch").await {
            Ok(result) if result.success => parse_branch_lines(&result.output),
            _ => Vec::new(),
        }
    }

    /// Current branch name; empty string when HEAD is detached. The empty
    /// string doubles as the detached signal for callers that already hold
    /// this value.
    pub async fn current_branch(dir: &Path) -> String {
        match runner::run_in(dir, "git branch --show-current").await {
            Ok(result) if result.success => result.output.trim().to_string(),
            _ => String::new(),
        }
    }

    /// Whether `git status` reports a detached HEAD.
    pub async fn is_detached_head(dir: &Path) -> bool {
        match runner::run_in(dir, "git status").await {
            Ok(result) => result.output.contains(DETACHED_MARKER),
            Err(_) => false,
        }
    }

    /// Whether the working tree has pending changes.
    pub async fn is_dirty(dir: &Path) -> bool {
        match runner::run_in(dir, "git status --porcelain").await {
            Ok(result) => !result.output.trim().is_empty(),
            Err(_) => false,
        }
    }

    /// Installed git version line, or `None` when the query produced nothing
    /// (interpreted as git not installed).
    pub async fn git_version(dir: &Path) -> Option<String> {
        let result = runner::run_in(dir, "git --version").await.ok()?;
        let version = result.output.trim().to_string();
        if version.is_empty() {
            None
        } else {
            Some(version)
        }
    }

    /// Compose the dirty and detached probes into the derived state the
    /// mutation policies reason about.
    pub async fn repository_state(dir: &Path) -> RepositoryState {
        let dirty = Self::is_dirty(dir).await;
        let status = match runner::run_in(dir, "git status").await {
            Ok(result) => result.output,
            Err(_) => String::new(),
        };
        match (detached_hash(&status), dirty) {
            (Some(hash), true) => RepositoryState::DetachedDirty(hash),
            (Some(hash), false) => RepositoryState::DetachedClean(hash),
            (None, true) => RepositoryState::AttachedDirty,
            (None, false) => RepositoryState::AttachedClean,
        }
    }
}

/// Split each log line at the first space only: hash, then the rest of the
/// line untouched.
pub fn parse_commit_lines(output: &str) -> Vec<CommitRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once(' ') {
            Some((hash, rest)) => CommitRecord {
                hash: hash.to_string(),
                rest: rest.to_string(),
            },
            None => CommitRecord {
                hash: line.to_string(),
                rest: String::new(),
            },
        })
        .collect()
}

/// Parse raw `git branch` lines. The detached pseudo-entry
/// `* (HEAD detached at <hash>)` stays in the list but is never marked
/// current, so callers see zero current branches while detached.
pub fn parse_branch_lines(output: &str) -> Vec<BranchRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| BranchRecord {
            raw: line.to_string(),
            is_current: line.starts_with('*') && !line.contains(DETACHED_MARKER),
        })
        .collect()
}

/// Extract the hash token immediately following the detached-HEAD marker in
/// `git status` output.
pub fn detached_hash(status_text: &str) -> Option<String> {
    let idx = status_text.find(DETACHED_MARKER)?;
    status_text[idx + DETACHED_MARKER.len()..]
        .split_whitespace()
        .next()
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commit_lines_splits_on_first_space_only() {
        let output = "a1b2c3d Add reverb bus 2 hours ago\n9f8e7d6 Initial commit 3 days ago\n";
        let records = parse_commit_lines(output);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].hash, "a1b2c3d");
        assert_eq!(records[0].rest, "Add reverb bus 2 hours ago");
        assert_eq!(records[1].hash, "9f8e7d6");
        assert_eq!(records[1].rest, "Initial commit 3 days ago");
    }

    #[test]
    fn test_parse_commit_lines_preserves_order() {
        let output = "1111111 newest now\n2222222 older 1 day ago\n3333333 oldest 2 days ago";
        let hashes: Vec<String> = parse_commit_lines(output)
            .into_iter()
            .map(|r| r.hash)
            .collect();
        assert_eq!(hashes, vec!["1111111", "2222222", "3333333"]);
    }

    #[test]
    fn test_parse_commit_lines_skips_blank_lines() {
        let records = parse_commit_lines("\nabc1234 message 1 hour ago\n\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hash, "abc1234");
    }

    #[test]
    fn test_parse_branch_lines_marks_exactly_one_current() {
        let output = "  feature-test\n* master\n  mix-ideas\n";
        let records = parse_branch_lines(output);
        assert_eq!(records.len(), 3);
        let current: Vec<&BranchRecord> = records.iter().filter(|r| r.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].name(), "master");
        // raw lines keep the marker and padding
        assert_eq!(records[0].raw, "  feature-test");
        assert_eq!(records[1].raw, "* master");
    }

    #[test]
    fn test_parse_branch_lines_detached_has_no_current() {
        let output = "* (HEAD detached at a1b2c3d)\n  master\n";
        let records = parse_branch_lines(output);
        assert_eq!(records.iter().filter(|r| r.is_current).count(), 0);
    }

    #[test]
    fn test_detached_hash_extraction() {
        let status = "HEAD detached at a1b2c3d\nnothing to commit, working tree clean\n";
        assert_eq!(detached_hash(status), Some("a1b2c3d".to_string()));
    }

    #[test]
    fn test_detached_hash_mid_text() {
        let status = "On branch output\nHEAD detached at 9f8e7d6 and more text";
        assert_eq!(detached_hash(status), Some("9f8e7d6".to_string()));
    }

    #[test]
    fn test_detached_hash_absent_on_branch() {
        let status = "On branch master\nChanges not staged for commit:\n";
        assert_eq!(detached_hash(status), None);
    }

    #[tokio::test]
    async fn test_queries_outside_repository_return_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GitQuery::commit_history(dir.path()).await.is_empty());
        assert!(GitQuery::branches(dir.path()).await.is_empty());
        assert_eq!(GitQuery::current_branch(dir.path()).await, "");
    }

    #[tokio::test]
    async fn test_git_version_spawn_failure_is_none() {
        let missing = std::path::PathBuf::from("/definitely/not/a/real/directory/xyz");
        assert_eq!(GitQuery::git_version(&missing).await, None);
    }
}
