//! Error types for cmdhost

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cmdhost operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Main error type for cmdhost
#[derive(Error, Debug)]
pub enum CliError {
    /// Command registration errors
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Dispatch errors that escape the host
    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    /// Host and manifest configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Registration-time failures. The registry is never modified by a failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("A command with the name '{0}' is already registered.")]
    CommandAlreadyExists(String),

    #[error("An alias '{0}' is already registered for another command.")]
    AliasAlreadyExists(String),

    #[error("{0}")]
    InvalidCommandConfiguration(String),
}

/// User-input failures found while binding tokens to a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Required argument '{0}' is missing.")]
    MissingRequiredArgument(String),

    #[error("Option '{0}' requires a value but none was provided.")]
    MissingOptionValue(String),

    #[error("Unrecognized argument or option: '{0}'.")]
    UnrecognizedArgument(String),

    #[error("Invalid value '{value}' for '{name}'. Expected type: {expected}.")]
    InvalidArgumentValue {
        name: String,
        value: String,
        expected: String,
    },
}

/// Dispatch-time failures
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Command '{0}' not found. Use '--help' for available commands.")]
    CommandNotFound(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The invoked target itself failed
    #[error("Error executing command: {}", .source.root_cause())]
    TargetFailed {
        command: String,
        source: anyhow::Error,
    },

    /// Writing help or diagnostics to the output sink failed
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Host and manifest configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find manifest file (searched: {0})")]
    NotFound(String),

    #[error("Failed to read manifest '{path}': {error}")]
    Read { path: PathBuf, error: String },

    #[error("Invalid manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Application name must be set")]
    MissingName,

    #[error("Failed to get current directory: {0}")]
    CurrentDir(#[source] io::Error),
}

/// Specialized result type for registration operations
pub type RegistrationResult<T> = std::result::Result<T, RegistrationError>;

/// Specialized result type for token binding
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Specialized result type for dispatch operations
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Shorthand for an `InvalidCommandConfiguration` error
pub(crate) fn invalid_config(message: impl Into<String>) -> RegistrationError {
    RegistrationError::InvalidCommandConfiguration(message.into())
}

/// Whether a dispatch error stems from user input rather than the target or the sink
pub fn is_user_error(err: &DispatchError) -> bool {
    matches!(
        err,
        DispatchError::CommandNotFound(_) | DispatchError::Parse(_)
    )
}
