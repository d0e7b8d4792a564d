//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Options could not be built or drawn from.
    #[error(transparent)]
    Selection(#[from] crate::selection::SelectionError),

    /// Option file could not be read or parsed.
    #[error("Option file error: {0}")]
    File(#[from] crate::input::FileError),

    /// Mail delivery failed.
    #[error(transparent)]
    Mail(#[from] crate::mail::MailError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
