//! Hometab - a start-page search engine for a note vault
//!
//! This library matches typed input against the files, headings and aliases
//! of a vault, against web bookmarks and history, or against an external
//! full-text index, and drives the suggestion popup of a search bar. The
//! host application is reached only through the traits in [`host`].

use thiserror::Error;

pub mod cli;
pub mod config;
pub mod files;
pub mod fuzzy;
pub mod host;
pub mod index;
pub mod model;
pub mod notice;
pub mod searchbar;
pub mod strategy;
pub mod suggest;

#[cfg(test)]
pub mod testing;

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum HomeTabError {
    /// Vault, workspace or backend failure
    #[error("Host error: {0}")]
    Host(#[from] host::HostError),
    /// Suggester failure
    #[error("Suggester error: {0}")]
    Suggest(#[from] suggest::SuggestError),
    /// A setting failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] config::ValidationError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, HomeTabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let err: HomeTabError = host::HostError::NotFound("a.md".into()).into();
        assert_eq!(err.to_string(), "Host error: Not found: a.md");

        let err: HomeTabError = suggest::SuggestError::Destroyed.into();
        assert!(matches!(err, HomeTabError::Suggest(_)));

        let err: HomeTabError = std::io::Error::other("disk").into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
