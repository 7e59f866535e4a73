use std::path::Path;

use tokio::process::Command;

use crate::error::EngineError;

/// Outcome of one subprocess invocation.
///
/// stdout and stderr are merged into `output` because the parsing layers look
/// for markers git prints to either stream (the detached-HEAD notice arrives
/// on stderr).
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub output: String,
    pub success: bool,
    pub code: Option<i32>,
}

/// Run a full shell command line inside `dir` and capture its merged output.
///
/// Commands go through the platform shell (`sh -c` / `cmd /C`) because
/// callers pass compound lines with `&&` and redirects. The working directory
/// is an explicit parameter on every call; nothing mutates the process-wide
/// current directory.
pub async fn run_in(dir: &Path, command_line: &str) -> Result<CommandResult, EngineError> {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", command_line]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", command_line]);
        c
    };

    let output = cmd
        .current_dir(dir)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(EngineError::SpawnFailed)?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    tracing::debug!(
        command = command_line,
        success = output.status.success(),
        code = output.status.code(),
        "ran shell command"
    );

    Ok(CommandResult {
        output: text,
        success: output.status.success(),
        code: output.status.code(),
    })
}
