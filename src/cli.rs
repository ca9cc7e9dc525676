//! Command-line interface definitions and parsing
//!
//! The `hometab` binary runs the search engine against a vault directory,
//! which is handy for scripting and for trying settings without an editor.
//!
//! # Commands
//!
//! - **search**: Fuzzy-search the vault (or a filter such as `web` or `png`)
//! - **web**: Bookmarks, history and search-engine suggestions
//! - **pick**: Icon, font or image picker
//! - **recent**: Recently opened and bookmarked files (default)
//! - **config**: Show the settings file
//!
//! # Examples
//!
//! ```
//! use hometab::cli::{Cli, Commands};
//! use clap::Parser;
//!
//! let cli = Cli::parse_from(["hometab", "search", "plan", "--filter", "md"]);
//! assert!(matches!(cli.get_command(), Commands::Search { .. }));
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Picker variant for the pick command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    /// Bundled icon names
    Icon,
    /// Installed font families
    Font,
    /// Image files of the vault
    Image,
}

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "hometab")]
#[command(about = "Start-page search for a note vault", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault directory
    #[arg(long = "vault", global = true, value_name = "DIR", default_value = ".")]
    pub vault: PathBuf,

    /// Settings file (defaults to the user config directory)
    #[arg(long = "settings", global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Log debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fuzzy-search the vault
    #[command(visible_alias = "s")]
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        /// Filter key: default, omni, web, a file type or an extension
        #[arg(short = 'f', long = "filter", value_name = "KEY")]
        filter: Option<String>,

        /// Maximum number of results (overrides settings)
        #[arg(short = 'm', long = "max", value_name = "N")]
        max: Option<usize>,

        /// Print results as JSON
        #[arg(long = "json")]
        json: bool,

        /// Open the top result
        #[arg(short = 'o', long = "open")]
        open: bool,
    },

    /// Search bookmarks, history and the web
    #[command(visible_alias = "w")]
    Web {
        #[arg(value_name = "QUERY")]
        query: String,

        /// Print results as JSON
        #[arg(long = "json")]
        json: bool,

        /// Open the top result in the browser
        #[arg(short = 'o', long = "open")]
        open: bool,
    },

    /// Pick an icon, font or image name
    Pick {
        #[arg(value_enum)]
        kind: PickerKind,

        #[arg(value_name = "QUERY", default_value = "")]
        query: String,
    },

    /// List recent and bookmarked files
    #[command(visible_alias = "r")]
    Recent {
        /// Print results as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Settings file management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the settings file location
    Path,
    /// Print the current settings
    Show,
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the command, defaulting to Recent if none specified
    #[must_use]
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Recent { json: false })
    }
}
