//! Error types for SMTP operations.

use std::io;
use std::time::Duration;

use crate::types::Reply;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Server rejected a command.
    #[error("SMTP error {code}: {message}")]
    SmtpError {
        /// Reply code (e.g., 550).
        code: u16,
        /// Error message from server.
        message: String,
    },

    /// The server sent something that is not a well-formed reply.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Feature not advertised by the server.
    #[error("Server does not support {0}")]
    NotSupported(String),

    /// A read or write did not complete in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl Error {
    /// Creates an SMTP error from a reply code and message.
    #[must_use]
    pub fn smtp_error(code: u16, message: impl Into<String>) -> Self {
        Self::SmtpError {
            code,
            message: message.into(),
        }
    }

    /// Builds the error for a rejected reply.
    #[must_use]
    pub fn rejected(reply: &Reply) -> Self {
        Self::smtp_error(reply.code.as_u16(), reply.message_text())
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::SmtpError { code, .. } if *code >= 500 && *code < 600)
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::SmtpError { code, .. } if *code >= 400 && *code < 500)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ReplyCode;

    #[test]
    fn classifies_reply_codes() {
        assert!(Error::smtp_error(550, "no such user").is_permanent());
        assert!(Error::smtp_error(451, "try later").is_transient());
        assert!(!Error::Protocol("garbage".into()).is_permanent());
    }

    #[test]
    fn rejected_joins_message_lines() {
        let reply = Reply::new(
            ReplyCode::AUTH_FAILED,
            vec!["5.7.8 Authentication".into(), "credentials invalid".into()],
        );
        let err = Error::rejected(&reply);
        assert_eq!(
            err.to_string(),
            "SMTP error 535: 5.7.8 Authentication\ncredentials invalid"
        );
    }
}
