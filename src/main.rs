use clap::Parser;
use dawgit::cli::args::{Args, Command};
use dawgit::config::Config;
use dawgit::engine::VcsEngine;
use dawgit::git::{BootstrapOutcome, OpOutcome, Reaction, Refusal};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = Config::new();
    let mut engine = VcsEngine::new(config);

    let project = args
        .project
        .unwrap_or(std::env::current_dir().map_err(|e| anyhow::anyhow!("Failed to resolve current directory: {}", e))?);
    engine.set_project_path(&project)?;

    match args.command {
        Command::Init => {
            match engine.check_for_git().await {
                BootstrapOutcome::AlreadyBootstrapped => {
                    println!("✓ Repository already initialized");
                }
                BootstrapOutcome::Initialized => {
                    println!("✓ Initialized repository in {}", project.display());
                }
                BootstrapOutcome::Failed(report) => {
                    println!("⚠ Initialization failed:\n{}", report);
                }
            }
        }
        Command::History => {
            let history = engine.commit_history().await;
            if history.is_empty() {
                println!("No commits found.");
            }
            for record in history {
                println!("{} {}", record.hash, record.rest);
            }
        }
        Command::Branches => {
            for branch in engine.branches().await {
                println!("{}", branch.raw);
            }
        }
        Command::Sync => match engine.react_to_change().await {
            Some(Reaction::Clean) => println!("Working tree clean, nothing to do."),
            Some(Reaction::AutoCommitted) => println!("✓ Auto-committed pending changes"),
            Some(Reaction::RecoveredDetached { branch }) => {
                println!("✓ Recovered detached HEAD onto branch '{}'", branch);
            }
            None => println!("⚠ Could not inspect the working tree"),
        },
        Command::Snapshot { message } => {
            report_outcome(engine.commit_snapshot(message.as_deref().unwrap_or("")).await);
        }
        Command::Checkout { index } => {
            report_outcome(engine.checkout_commit(index).await);
        }
        Command::Switch { name } => {
            report_outcome(engine.checkout_branch(&name).await);
        }
        Command::Branch { name } => {
            report_outcome(engine.create_branch(&name).await);
        }
        Command::Merge => {
            report_outcome(engine.merge_current_into_primary().await);
        }
        Command::Delete => {
            report_outcome(engine.delete_current_branch().await);
        }
        Command::Return => {
            report_outcome(engine.return_to_primary().await);
        }
        Command::Exec { command_line } => {
            print!("{}", engine.execute_command(&command_line).await);
        }
        Command::Doctor => {
            println!("OS: {}", engine.os());
            match engine.ensure_git().await {
                Ok(version) => println!("Git: {}", version),
                Err(_) => println!("Git: not installed"),
            }
            if let Some(state) = engine.repository_state().await {
                println!("State: {:?}", state);
            } else {
                println!("State: no repository");
            }
        }
    }

    Ok(())
}

fn report_outcome(outcome: Option<OpOutcome>) {
    match outcome {
        Some(OpOutcome::Done(result)) => {
            if result.success {
                println!("✓ Done");
            } else {
                println!("⚠ Command exited with {:?}", result.code);
            }
            if !result.output.trim().is_empty() {
                println!("{}", result.output.trim_end());
            }
        }
        Some(OpOutcome::Refused(refusal)) => println!("{}", refusal_message(refusal)),
        None => println!("⚠ Operation could not run"),
    }
}

fn refusal_message(refusal: Refusal) -> &'static str {
    match refusal {
        Refusal::IndexOutOfRange => "Selection is outside the commit list, nothing done.",
        Refusal::NotDetached => "Not on a detached HEAD, nothing to return from.",
        Refusal::EmptyBranchName => "Branch name is empty.",
        Refusal::PrimaryBranchProtected => "The primary branch cannot be deleted.",
        Refusal::DetachedHead => "Detached HEAD; returned to the primary branch instead.",
        Refusal::AlreadyOnPrimary => "Already on the primary branch.",
        Refusal::NoCurrentBranch => "No current branch; return to the primary branch first.",
    }
}
