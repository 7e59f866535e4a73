use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// The single project directory all git invocations operate against.
///
/// At most one binding is active in the engine; rebinding to an empty or
/// missing path clears it.
#[derive(Debug, Clone)]
pub struct ProjectBinding {
    path: PathBuf,
    os: &'static str,
}

impl ProjectBinding {
    /// Bind a project directory. Fails when the path is empty or is not an
    /// existing directory.
    pub fn bind(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        if path.as_os_str().is_empty() || !path.is_dir() {
            return Err(EngineError::InvalidPath(path));
        }
        Ok(ProjectBinding {
            path,
            os: std::env::consts::OS,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-checked at call time so a directory deleted after binding stops
    /// being targeted instead of producing spawn errors downstream.
    pub fn is_valid(&self) -> bool {
        self.path.is_dir()
    }

    pub fn os(&self) -> &'static str {
        self.os
    }
}
