//! Mail delivery of a selection.
//!
//! Bridges the notifier and the SMTP client: configuration file, password
//! lookup, message composition and the SMTP session itself.

pub mod config;
pub mod credentials;
pub mod message;
pub mod send;

pub use config::{
    MAIL_HELP, MailConfig, Security, ValidationError, ValidationResult, validate_config,
};
pub use credentials::{PASSWORD_ENV_VAR, Password, resolve_password};
pub use message::{OutgoingMessage, TransferEncoding};
pub use send::{MailError, send_email};
