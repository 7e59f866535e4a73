use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "dawgit",
    version,
    about = "Version control for DAW project directories - snapshots, branches and detached-HEAD recovery on top of plain git",
    long_about = "dawgit binds to one project directory, bootstraps a git repository with a DAW-appropriate ignore file, auto-commits changes the host writes behind your back and recovers work stranded on a detached HEAD onto a real branch."
)]
pub struct Args {
    /// Project directory to operate on (defaults to the current directory)
    #[arg(short = 'C', long, value_name = "DIR", global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Make sure the project directory is a git repository
    Init,
    /// Print the commit history, newest first
    History,
    /// Print the raw branch list
    Branches,
    /// Auto-commit pending changes, or recover a detached HEAD
    Sync,
    /// Take a snapshot: commit everything with a message of your choosing
    Snapshot {
        /// Commit message; omitted or blank falls back to a placeholder
        message: Option<String>,
    },
    /// Check out a commit by its position in the history list (0 = newest)
    Checkout {
        index: usize,
    },
    /// Check out a branch by name
    Switch {
        name: String,
    },
    /// Create a branch and switch to it (spaces become hyphens)
    Branch {
        name: String,
    },
    /// Merge the current branch into the primary branch and delete it
    Merge,
    /// Delete the current branch and land on the primary branch
    Delete,
    /// Return to the primary branch from a detached HEAD
    Return,
    /// Run a raw command line inside the project directory
    Exec {
        command_line: String,
    },
    /// Report OS, git version and repository state
    Doctor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_history() {
        let args = Args::parse_from(["dawgit", "history"]);
        assert!(args.project.is_none());
        assert!(matches!(args.command, Command::History));
    }

    #[test]
    fn test_args_project_flag() {
        let args = Args::parse_from(["dawgit", "-C", "/tmp/project", "branches"]);
        assert_eq!(args.project, Some(PathBuf::from("/tmp/project")));
        assert!(matches!(args.command, Command::Branches));
    }

    #[test]
    fn test_args_checkout_index() {
        let args = Args::parse_from(["dawgit", "checkout", "2"]);
        match args.command {
            Command::Checkout { index } => assert_eq!(index, 2),
            other => panic!("expected Checkout, got {:?}", other),
        }
    }

    #[test]
    fn test_args_branch_name() {
        let args = Args::parse_from(["dawgit", "branch", "feature test"]);
        match args.command {
            Command::Branch { name } => assert_eq!(name, "feature test"),
            other => panic!("expected Branch, got {:?}", other),
        }
    }

    #[test]
    fn test_args_snapshot_message_is_optional() {
        let args = Args::parse_from(["dawgit", "snapshot"]);
        match args.command {
            Command::Snapshot { message } => assert!(message.is_none()),
            other => panic!("expected Snapshot, got {:?}", other),
        }

        let args = Args::parse_from(["dawgit", "snapshot", "added pads"]);
        match args.command {
            Command::Snapshot { message } => assert_eq!(message.as_deref(), Some("added pads")),
            other => panic!("expected Snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_args_global_project_after_subcommand() {
        let args = Args::parse_from(["dawgit", "sync", "-C", "/music/song"]);
        assert_eq!(args.project, Some(PathBuf::from("/music/song")));
    }
}
