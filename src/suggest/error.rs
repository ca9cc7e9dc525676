//! Suggester error types
//!
//! Most suggester failures are contained: fetch errors become an empty list
//! and selection errors are logged. These variants surface where a caller
//! can act on them, such as an invalid key binding or a strategy swap on a
//! destroyed suggester.

use crate::host::HostError;
use thiserror::Error;

/// Suggester and strategy errors
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Key binding string could not be parsed
    #[error("Invalid key binding: {0}")]
    InvalidKey(String),

    /// The suggester was destroyed and cannot be reused
    #[error("Suggester has been destroyed")]
    Destroyed,

    /// Required backend is not enabled
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Host collaborator failed
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

pub type Result<T> = std::result::Result<T, SuggestError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
