use std::path::Path;

use crate::config::Config;
use crate::git::runner;

/// Result of an `ensure_repository` pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The `.git` marker directory was already present.
    AlreadyBootstrapped,
    /// The repository was initialized by this call and verified afterwards.
    Initialized,
    /// The init sequence ran but the marker is still missing (e.g. a
    /// permission problem). The directory is untouched enough to retry.
    Failed(String),
}

/// Turns a plain project directory into a git repository with an ignore file
/// and an initial commit.
pub struct GitBootstrap;

impl GitBootstrap {
    /// Make sure `dir` is a git repository, initializing one when the `.git`
    /// marker directory is missing.
    ///
    /// The re-check after the init commands runs exactly once instead of
    /// recursing, so a silently failing `git init` reports `Failed` rather
    /// than looping.
    pub async fn ensure_repository(dir: &Path, config: &Config) -> anyhow::Result<BootstrapOutcome> {
        if Self::is_bootstrapped(dir) {
            return Ok(BootstrapOutcome::AlreadyBootstrapped);
        }

        tracing::info!(path = %dir.display(), "git repository not found, initializing");

        let mut report = String::new();
        for command in Self::bootstrap_commands(config) {
            let result = runner::run_in(dir, &command)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to run '{}': {}", command, e))?;
            report.push_str(&result.output);
            if !result.success {
                tracing::warn!(command = %command, code = ?result.code, "bootstrap command failed");
            }
        }

        if Self::is_bootstrapped(dir) {
            tracing::info!(path = %dir.display(), "git repository initialized");
            Ok(BootstrapOutcome::Initialized)
        } else {
            Ok(BootstrapOutcome::Failed(report))
        }
    }

    /// Whether the marker directory is present.
    pub fn is_bootstrapped(dir: &Path) -> bool {
        dir.join(".git").is_dir()
    }

    /// The full init sequence: repository, ignore file, initial commit.
    /// `git init -b` pins the primary branch name so later policy checks
    /// never depend on the machine-wide `init.defaultBranch`.
    fn bootstrap_commands(config: &Config) -> Vec<String> {
        vec![
            format!("git init -b {}", config.primary_branch),
            ignore_file_command(&config.ignore_patterns),
            "git add .".to_string(),
            r#"git commit -m "Initial commit""#.to_string(),
        ]
    }
}

/// Build the shell line that writes the ignore file. Creation goes through a
/// shell redirect rather than a direct file write, so the quoting differs per
/// platform (cmd echoes the text verbatim, sh needs the patterns quoted
/// because one contains spaces).
fn ignore_file_command(patterns: &[String]) -> String {
    patterns
        .iter()
        .enumerate()
        .map(|(i, pattern)| {
            let redirect = if i == 0 { ">" } else { ">>" };
            if cfg!(windows) {
                format!("echo {} {} .gitignore", pattern, redirect)
            } else {
                format!("echo '{}' {} .gitignore", pattern, redirect)
            }
        })
        .collect::<Vec<_>>()
        .join(" && ")
}
