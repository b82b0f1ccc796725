//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Extension error: {0}")]
    Extension(#[from] ExtensionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied")]
    PermissionDenied,
}

/// Extension registry errors
///
/// `Setup` covers the extension's registration entry point failing before
/// anything is registered; `Construction` covers a single group factory
/// failing after setup succeeded. Loading an already loaded extension or
/// registering a group name twice is always surfaced, never ignored.
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("Unknown extension: {0}")]
    Unknown(String),

    #[error("Extension '{0}' is already loaded")]
    AlreadyLoaded(String),

    #[error("Extension '{0}' is not loaded")]
    NotLoaded(String),

    #[error("Extension '{name}' failed to set up: {reason}")]
    Setup { name: String, reason: String },

    #[error("Group '{group}' of extension '{extension}' failed to construct: {reason}")]
    Construction {
        extension: String,
        group: String,
        reason: String,
    },

    #[error("Group '{0}' is already registered")]
    DuplicateGroup(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
