//! Domain-specific error types for the dotlink engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`DirectiveError`]) while the command handler at the CLI boundary converts
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! Per-target link problems are *not* errors: they are reported as
//! [`LinkFailure`](crate::resources::LinkFailure) values and folded into the
//! directive result so sibling targets still run.
//!
//! # Error hierarchy
//!
//! ```text
//! DotlinkError
//! ├── Config(ConfigError)       — config files, options, base directory
//! └── Directive(DirectiveError) — directive data a plugin cannot process
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the dotlink engine.
#[derive(Error, Debug)]
pub enum DotlinkError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Directive processing error.
    #[error("Directive error: {0}")]
    Directive(#[from] DirectiveError),
}

/// Errors that arise from configuration loading and option parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No configuration file was given on the command line.
    #[error("No configuration file specified")]
    NoConfigFile,

    /// A configuration file could not be read.
    #[error("Could not read config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration file is not valid YAML or JSON.
    #[error("Could not parse config file {path}: {message}")]
    Parse {
        /// Path to the offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The top level of a configuration file is not a list of tasks.
    #[error("Configuration file must be a list of tasks: {0}")]
    NotATaskList(PathBuf),

    /// The base directory does not exist.
    #[error("Nonexistent base directory: {0}")]
    NonexistentBaseDirectory(PathBuf),

    /// A `type` option named something other than `symlink` or `hardlink`.
    #[error("The link type is not recognized: '{0}'")]
    UnknownLinkType(String),

    /// Directive options had the wrong shape (e.g. a string where a bool belongs).
    #[error("Invalid options for '{directive}': {message}")]
    InvalidOptions {
        /// Directive whose options failed to parse.
        directive: String,
        /// Deserializer message.
        message: String,
    },
}

/// Errors a plugin returns from `handle`.
///
/// [`DirectiveError::NotApplicable`] means "not mine" rather than "failed":
/// the dispatcher moves on to the next plugin instead of counting a failure.
#[derive(Error, Debug)]
pub enum DirectiveError {
    /// The plugin was asked to handle a directive it does not own.
    #[error("{plugin} cannot handle directive {directive}")]
    NotApplicable {
        /// Plugin name.
        plugin: String,
        /// Directive name that was offered.
        directive: String,
    },

    /// Directive data had an unexpected shape.
    #[error("Invalid data for directive '{directive}': {message}")]
    InvalidData {
        /// Directive name.
        directive: String,
        /// What was wrong with the data.
        message: String,
    },

    /// A configuration error surfaced while resolving directive options.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DirectiveError {
    /// Shorthand for [`DirectiveError::InvalidData`].
    #[must_use]
    pub fn invalid(directive: &str, message: impl Into<String>) -> Self {
        Self::InvalidData {
            directive: directive.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error only means the plugin does not own the directive.
    #[must_use]
    pub const fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable { .. })
    }
}
