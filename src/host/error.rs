//! Host collaborator errors

use thiserror::Error;

/// Failures reported by vault, workspace and backend implementations
#[derive(Debug, Error)]
pub enum HostError {
    /// No file or folder at the path
    #[error("Not found: {0}")]
    NotFound(String),

    /// Target path is already taken
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Backend refused or failed a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// Front matter could not be parsed
    #[error("Front matter error: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HostError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
