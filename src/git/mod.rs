pub mod binding;
pub mod bootstrap;
pub mod ops;
pub mod query;
pub mod react;
pub mod runner;

pub use binding::ProjectBinding;
pub use bootstrap::{BootstrapOutcome, GitBootstrap};
pub use ops::{GitOps, OpOutcome, Refusal};
pub use query::{BranchRecord, CommitRecord, GitQuery, RepositoryState};
pub use react::{ChangeEvent, ChangeReactor, Reaction};
pub use runner::CommandResult;
