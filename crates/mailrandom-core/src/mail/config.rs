//! Mail configuration file.

use std::path::Path;

use std::time::Duration;

use mailrandom_smtp::connection::DEFAULT_TIMEOUT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Description of the configuration file, printed by `--mail-help`.
pub const MAIL_HELP: &str = r#"The format of the mail configuration JSON file is as follows:
  {
    "Server":   "smtp.example-server.com",
    "Port":     587,
    "Username": "myself@example-server.com",
    "To":       "myself@example-server.com",
    "From":     "myself@example-server.com",
    "Security": "Auto",
    "Timeout":  30
  }
Username can be omitted if authentication is not required.
Security is one of "Auto" (default: STARTTLS when offered), "StartTls", "Tls" or "None".
Timeout is the limit in seconds for connecting and for each server exchange (default 30).
The password is taken from the -p flag or the MAIL_PASS environment variable."#;

/// Transport security for the SMTP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    /// Upgrade with STARTTLS when the server offers it.
    #[default]
    Auto,
    /// Require a STARTTLS upgrade.
    StartTls,
    /// Implicit TLS (connect directly with TLS).
    Tls,
    /// No encryption (not recommended).
    None,
}

/// SMTP relay and envelope settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MailConfig {
    /// Server hostname.
    #[serde(alias = "server")]
    pub server: String,
    /// Server port.
    #[serde(alias = "port")]
    pub port: u16,
    /// Username for authentication; empty disables authentication.
    #[serde(default, alias = "username")]
    pub username: String,
    /// Recipient address.
    #[serde(alias = "to")]
    pub to: String,
    /// Sender address.
    #[serde(alias = "from")]
    pub from: String,
    /// Security mode.
    #[serde(default, alias = "security")]
    pub security: Security,
    /// Connect and I/O timeout in seconds.
    #[serde(rename = "Timeout", alias = "timeout", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl MailConfig {
    /// Parses a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or misses a required field.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or
    /// fails [`validate_config`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        validate_config(&config).map_err(|errors| {
            Error::Config(
                errors
                    .iter()
                    .map(ValidationError::message)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        debug!(
            server = %config.server,
            port = config.port,
            security = ?config.security,
            "loaded mail configuration"
        );
        Ok(config)
    }

    /// Bound on connecting and on each server exchange.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether the relay expects AUTH.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        !self.username.is_empty()
    }
}

/// Validation error for a mail configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Server is empty.
    EmptyServer,
    /// Port is zero.
    InvalidPort,
    /// Timeout is zero.
    InvalidTimeout,
    /// Recipient is empty.
    EmptyTo,
    /// Recipient is not an address.
    InvalidTo,
    /// Sender is empty.
    EmptyFrom,
    /// Sender is not an address.
    InvalidFrom,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyServer => "Server is required",
            Self::InvalidPort => "Port must be 1-65535",
            Self::InvalidTimeout => "Timeout must be at least 1 second",
            Self::EmptyTo => "To address is required",
            Self::InvalidTo => "Invalid To address",
            Self::EmptyFrom => "From address is required",
            Self::InvalidFrom => "Invalid From address",
        }
    }

    /// Get the configuration key this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyServer => "Server",
            Self::InvalidPort => "Port",
            Self::InvalidTimeout => "Timeout",
            Self::EmptyTo | Self::InvalidTo => "To",
            Self::EmptyFrom | Self::InvalidFrom => "From",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a configuration.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a mail configuration, collecting every problem.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any fields are invalid.
pub fn validate_config(config: &MailConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.server.trim().is_empty() {
        errors.push(ValidationError::EmptyServer);
    }
    if config.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    if config.timeout_secs == 0 {
        errors.push(ValidationError::InvalidTimeout);
    }

    if config.to.trim().is_empty() {
        errors.push(ValidationError::EmptyTo);
    } else if mailrandom_smtp::Address::new(config.to.as_str()).is_err() {
        errors.push(ValidationError::InvalidTo);
    }

    if config.from.trim().is_empty() {
        errors.push(ValidationError::EmptyFrom);
    } else if mailrandom_smtp::Address::new(config.from.as_str()).is_err() {
        errors.push(ValidationError::InvalidFrom);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Server": "smtp.example-server.com",
        "Port": 587,
        "Username": "myself@example-server.com",
        "To": "myself@example-server.com",
        "From": "myself@example-server.com"
    }"#;

    #[test]
    fn parses_documented_layout() {
        let config = MailConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.server, "smtp.example-server.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.security, Security::Auto);
        assert!(config.requires_auth());
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn help_text_parses_as_a_config() {
        let start = MAIL_HELP.find('{').unwrap();
        let end = MAIL_HELP.rfind('}').unwrap();
        assert!(MailConfig::from_json(&MAIL_HELP[start..=end]).is_ok());
    }

    #[test]
    fn username_and_security_are_optional() {
        let config = MailConfig::from_json(
            r#"{"Server": "localhost", "Port": 25, "To": "a@b.c", "From": "d@e.f"}"#,
        )
        .unwrap();
        assert!(!config.requires_auth());
        assert_eq!(config.security, Security::Auto);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn timeout_is_read_in_seconds() {
        let config = MailConfig::from_json(
            r#"{"Server": "mx", "Port": 25, "To": "a@b.c", "From": "d@e.f", "Timeout": 5}"#,
        )
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn accepts_lowercase_keys_and_security_mode() {
        let config = MailConfig::from_json(
            r#"{"server": "mx", "port": 465, "to": "a@b.c", "from": "d@e.f", "security": "Tls"}"#,
        )
        .unwrap();
        assert_eq!(config.security, Security::Tls);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = MailConfig::from_json(r#"{"Server": "mx", "Port": 25}"#).unwrap_err();
        assert!(matches!(err, Error::Serde(_)));
    }

    #[test]
    fn validation_collects_all_errors() {
        let config = MailConfig {
            server: " ".into(),
            port: 0,
            username: String::new(),
            to: "not-an-address".into(),
            from: String::new(),
            security: Security::None,
            timeout_secs: 0,
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyServer,
                ValidationError::InvalidPort,
                ValidationError::InvalidTimeout,
                ValidationError::InvalidTo,
                ValidationError::EmptyFrom,
            ]
        );
        assert_eq!(errors[2].field(), "Timeout");
        assert_eq!(errors[3].field(), "To");
    }
}
