use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while installing or uninstalling a deployment unit.
#[derive(Debug, Error)]
pub enum InstallationError {
    #[error("Deployment source '{0}' does not exist")]
    SourceNotFound(PathBuf),

    #[error("Invalid unit layout at '{path}': {message}")]
    InvalidLayout { path: PathBuf, message: String },

    #[error("I/O error during '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl InstallationError {
    pub fn io(path: &std::path::Path, operation: &str, source: std::io::Error) -> Self {
        InstallationError::Io {
            path: path.to_path_buf(),
            operation: operation.to_string(),
            source,
        }
    }
}
