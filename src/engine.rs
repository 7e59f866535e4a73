use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::EngineError;
use crate::git::binding::ProjectBinding;
use crate::git::bootstrap::{BootstrapOutcome, GitBootstrap};
use crate::git::ops::{GitOps, OpOutcome};
use crate::git::query::{BranchRecord, CommitRecord, GitQuery, RepositoryState};
use crate::git::react::{ChangeEvent, ChangeReactor, Reaction};
use crate::git::runner;

/// Notification fired whenever the commit history may have changed.
pub type HistoryChangedCallback = Box<dyn Fn() + Send + Sync>;

/// Hook handed the project files found after a checkout-class mutation so the
/// host application can reload their content.
pub type ReloadHook = Box<dyn Fn(&[PathBuf]) + Send + Sync>;

/// The engine state the host persists across restarts: just the bound
/// project path, restored verbatim.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EngineState {
    pub project_path: Option<String>,
}

/// Orchestrates git against one bound project directory.
///
/// All queries and mutations implicitly target the active binding; with no
/// valid binding they return empty results and never fail. Operations run one
/// at a time (`&mut self` mutations), so no two git invocations are ever in
/// flight against the same binding.
pub struct VcsEngine {
    config: Config,
    binding: Option<ProjectBinding>,
    history_callbacks: Vec<HistoryChangedCallback>,
    reload_hook: Option<ReloadHook>,
    events: Vec<ChangeEvent>,
}

/// Upper bound on the retained reaction log.
const MAX_EVENTS: usize = 50;

impl VcsEngine {
    pub fn new(config: Config) -> Self {
        VcsEngine {
            config,
            binding: None,
            history_callbacks: Vec::new(),
            reload_hook: None,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---- binding -----------------------------------------------------------

    /// Bind the engine to a project directory. An empty path clears the
    /// binding; a missing path clears it and reports `InvalidPath`.
    pub fn set_project_path(&mut self, path: impl Into<PathBuf>) -> Result<(), EngineError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            self.binding = None;
            return Ok(());
        }
        match ProjectBinding::bind(path) {
            Ok(binding) => {
                tracing::info!(path = %binding.path().display(), "bound project directory");
                self.binding = Some(binding);
                Ok(())
            }
            Err(e) => {
                self.binding = None;
                Err(e)
            }
        }
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.binding.as_ref().map(|b| b.path())
    }

    pub fn os(&self) -> &'static str {
        std::env::consts::OS
    }

    /// The bound directory, provided it still exists on disk.
    fn bound_dir(&self) -> Option<&Path> {
        self.binding
            .as_ref()
            .filter(|b| b.is_valid())
            .map(|b| b.path())
    }

    // ---- bootstrap ---------------------------------------------------------

    /// Make sure the bound directory is a git repository. Bootstrap failures
    /// are reported in the outcome, never raised; the next call simply finds
    /// the repository still missing and retries.
    pub async fn check_for_git(&self) -> BootstrapOutcome {
        let Some(dir) = self.bound_dir() else {
            return BootstrapOutcome::Failed("no project directory bound".to_string());
        };
        match GitBootstrap::ensure_repository(dir, &self.config).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "repository bootstrap failed");
                BootstrapOutcome::Failed(e.to_string())
            }
        }
    }

    // ---- queries -----------------------------------------------------------

    /// Raw escape hatch for ad hoc commands. Empty string with no valid
    /// binding or when the process cannot be launched.
    pub async fn execute_command(&self, command_line: &str) -> String {
        let Some(dir) = self.bound_dir() else {
            return String::new();
        };
        match runner::run_in(dir, command_line).await {
            Ok(result) => result.output,
            Err(e) => {
                tracing::warn!(command = command_line, error = %e, "command failed to launch");
                String::new()
            }
        }
    }

    pub async fn commit_history(&self) -> Vec<CommitRecord> {
        match self.bound_dir() {
            Some(dir) => GitQuery::commit_history(dir).await,
            None => Vec::new(),
        }
    }

    pub async fn branches(&self) -> Vec<BranchRecord> {
        match self.bound_dir() {
            Some(dir) => GitQuery::branches(dir).await,
            None => Vec::new(),
        }
    }

    pub async fn current_branch(&self) -> String {
        match self.bound_dir() {
            Some(dir) => GitQuery::current_branch(dir).await,
            None => String::new(),
        }
    }

    pub async fn repository_state(&self) -> Option<RepositoryState> {
        match self.bound_dir() {
            Some(dir) => Some(GitQuery::repository_state(dir).await),
            None => None,
        }
    }

    /// Installed git version; `None` means git is not installed. Runs even
    /// without a binding so the host can report git availability up front.
    pub async fn git_version(&self) -> Option<String> {
        let dir = self.bound_dir().unwrap_or(Path::new("."));
        GitQuery::git_version(dir).await
    }

    /// Like `git_version`, as an error for callers that need git present.
    pub async fn ensure_git(&self) -> Result<String, EngineError> {
        self.git_version().await.ok_or(EngineError::GitNotInstalled)
    }

    // ---- change reaction ---------------------------------------------------

    /// Run the change-reaction pass: auto-commit a dirty attached tree, or
    /// pin a dirty detached HEAD to a recovery branch. Returns what was done;
    /// `None` with no valid binding.
    pub async fn react_to_change(&mut self) -> Option<Reaction> {
        let dir = self.bound_dir()?.to_path_buf();
        match ChangeReactor::react_to_change(&dir, &self.config).await {
            Ok(Reaction::Clean) => Some(Reaction::Clean),
            Ok(reaction) => {
                self.events.push(ChangeEvent::new(reaction.clone()));
                if self.events.len() > MAX_EVENTS {
                    self.events.remove(0);
                }
                self.notify_history_changed();
                Some(reaction)
            }
            Err(e) => {
                tracing::warn!(error = %e, "change reaction failed");
                None
            }
        }
    }

    /// Reactions that changed the repository, oldest first.
    pub fn recent_events(&self) -> &[ChangeEvent] {
        &self.events
    }

    // ---- mutations ---------------------------------------------------------

    /// Check out the commit at `index` in the current history.
    pub async fn checkout_commit(&mut self, index: usize) -> Option<OpOutcome> {
        let dir = self.bound_dir()?.to_path_buf();
        let history = GitQuery::commit_history(&dir).await;
        let outcome = GitOps::checkout_commit(&dir, &history, index).await;
        self.finish_mutation(outcome).await
    }

    /// Check out a branch by name.
    pub async fn checkout_branch(&mut self, name: &str) -> Option<OpOutcome> {
        let dir = self.bound_dir()?.to_path_buf();
        let outcome = GitOps::checkout_branch(&dir, name).await;
        self.finish_mutation(outcome).await
    }

    /// Return from a detached HEAD to the primary branch.
    pub async fn return_to_primary(&mut self) -> Option<OpOutcome> {
        let dir = self.bound_dir()?.to_path_buf();
        let outcome = GitOps::return_to_primary(&dir, &self.config.primary_branch).await;
        self.finish_mutation(outcome).await
    }

    /// Create a branch (spaces become hyphens) and switch to it.
    pub async fn create_branch(&mut self, name: &str) -> Option<OpOutcome> {
        let dir = self.bound_dir()?.to_path_buf();
        let outcome = GitOps::create_branch(&dir, name).await;
        self.finish_mutation(outcome).await
    }

    /// Delete the current branch and land on the primary branch.
    pub async fn delete_current_branch(&mut self) -> Option<OpOutcome> {
        let dir = self.bound_dir()?.to_path_buf();
        let outcome = GitOps::delete_current_branch(&dir, &self.config.primary_branch).await;
        self.finish_mutation(outcome).await
    }

    /// Take a snapshot: stage everything and commit with a user-supplied
    /// message (blank falls back to a placeholder). Unlike the
    /// checkout-class mutations this changes history without touching the
    /// checked-out content, so subscribers are notified but the project
    /// files are not reloaded.
    pub async fn commit_snapshot(&mut self, message: &str) -> Option<OpOutcome> {
        let dir = self.bound_dir()?.to_path_buf();
        match GitOps::commit_snapshot(&dir, message).await {
            Ok(outcome) => {
                self.notify_history_changed();
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "snapshot commit failed");
                None
            }
        }
    }

    /// Merge the current branch into the primary branch and delete it.
    pub async fn merge_current_into_primary(&mut self) -> Option<OpOutcome> {
        let dir = self.bound_dir()?.to_path_buf();
        let outcome =
            GitOps::merge_current_into_primary(&dir, &self.config.primary_branch).await;
        self.finish_mutation(outcome).await
    }

    /// Shared tail of every mutation: log launch failures, then refresh the
    /// host view (reload project files, notify history subscribers)
    /// unconditionally, exactly as the execute-and-refresh shape prescribes.
    async fn finish_mutation(
        &mut self,
        outcome: anyhow::Result<OpOutcome>,
    ) -> Option<OpOutcome> {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "mutating operation failed");
                return None;
            }
        };
        if let OpOutcome::Refused(refusal) = &outcome {
            tracing::warn!(?refusal, "operation refused");
        }
        self.reload_working_tree();
        self.notify_history_changed();
        Some(outcome)
    }

    // ---- host integration --------------------------------------------------

    /// Collect the project files in the bound directory and hand them to the
    /// reload hook, so the host picks up content changed by a checkout. The
    /// scan is non-recursive: project files live at the project root.
    pub fn reload_working_tree(&self) {
        let Some(dir) = self.bound_dir() else {
            return;
        };
        let files = project_files(dir, &self.config.project_file_extensions);
        match &self.reload_hook {
            Some(hook) => hook(&files),
            None => {
                tracing::debug!(count = files.len(), "no reload hook registered");
            }
        }
    }

    pub fn set_reload_hook(&mut self, hook: ReloadHook) {
        self.reload_hook = Some(hook);
    }

    /// Subscribe to history-changed notifications. Subscribers accumulate;
    /// registering never replaces an earlier callback.
    pub fn add_history_changed_callback(&mut self, callback: HistoryChangedCallback) {
        self.history_callbacks.push(callback);
    }

    fn notify_history_changed(&self) {
        for callback in &self.history_callbacks {
            callback();
        }
    }

    // ---- persisted state ---------------------------------------------------

    /// Serialize the state the host stores in its opaque blob.
    pub fn save_state(&self) -> String {
        let state = EngineState {
            project_path: self
                .binding
                .as_ref()
                .map(|b| b.path().to_string_lossy().into_owned()),
        };
        serde_json::to_string(&state).unwrap_or_default()
    }

    /// Restore a previously saved blob. An unreadable blob or stale path
    /// leaves the engine unbound rather than failing.
    pub fn restore_state(&mut self, blob: &str) {
        let state: EngineState = match serde_json::from_str(blob) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "could not parse persisted engine state");
                return;
            }
        };
        if let Some(path) = state.project_path {
            if let Err(e) = self.set_project_path(path) {
                tracing::warn!(error = %e, "persisted project path is no longer valid");
            }
        }
    }
}

/// Files directly under `dir` whose extension is in `extensions`.
fn project_files(dir: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|e| e == ext))
        })
        .collect();
    files.sort();
    files
}
