use std::path::PathBuf;

/// Failure modes the engine reports as errors. Policy refusals (deleting the
/// primary branch, out-of-range checkout) are plain values in `git::ops`, and
/// ordinary query failures degrade to empty results instead of surfacing here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The project path does not exist or is empty.
    #[error("invalid project path: {0}")]
    InvalidPath(PathBuf),

    /// The child process could not be launched at all. Distinct from a
    /// command that ran and printed nothing.
    #[error("failed to spawn process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// `git --version` produced no output.
    #[error("git is not installed")]
    GitNotInstalled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = EngineError::InvalidPath(PathBuf::from("/music/song"));
        assert!(err.to_string().contains("/music/song"));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert!(EngineError::SpawnFailed(io).to_string().contains("spawn"));

        assert_eq!(
            EngineError::GitNotInstalled.to_string(),
            "git is not installed"
        );
    }

    #[test]
    fn test_spawn_failed_keeps_the_source() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EngineError::SpawnFailed(io);
        assert!(err.source().is_some());
    }
}
