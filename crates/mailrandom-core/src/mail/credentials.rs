//! SMTP password resolution.

use super::config::MailConfig;
use super::send::MailError;

/// Environment variable consulted when no password flag is given.
pub const PASSWORD_ENV_VAR: &str = "MAIL_PASS";

/// A password that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wraps a secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret for use on the wire.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Picks the password for `config`.
///
/// A non-empty `flag` wins; otherwise `env` is asked for
/// [`PASSWORD_ENV_VAR`]. When the configuration has no username no password
/// is needed and `None` is returned.
///
/// # Errors
///
/// Returns [`MailError::MissingPassword`] if a username is configured and
/// neither source provides a password.
pub fn resolve_password<F>(
    config: &MailConfig,
    flag: Option<&str>,
    env: F,
) -> Result<Option<Password>, MailError>
where
    F: FnOnce(&str) -> Option<String>,
{
    if !config.requires_auth() {
        return Ok(None);
    }
    if let Some(password) = flag.filter(|p| !p.is_empty()) {
        return Ok(Some(Password::new(password)));
    }
    env(PASSWORD_ENV_VAR)
        .map(|password| Some(Password::new(password)))
        .ok_or(MailError::MissingPassword)
}

/// Reads an environment variable, treating non-UTF-8 values as unset.
#[must_use]
pub fn from_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mail::Security;

    fn config(username: &str) -> MailConfig {
        MailConfig {
            server: "smtp.example.com".into(),
            port: 587,
            username: username.into(),
            to: "to@example.com".into(),
            from: "from@example.com".into(),
            security: Security::Auto,
            timeout_secs: 30,
        }
    }

    fn env_with(value: Option<&'static str>) -> impl FnOnce(&str) -> Option<String> {
        move |name| {
            assert_eq!(name, PASSWORD_ENV_VAR);
            value.map(str::to_string)
        }
    }

    #[test]
    fn flag_overrides_environment() {
        let password = resolve_password(&config("me"), Some("flag"), env_with(Some("env")))
            .unwrap()
            .unwrap();
        assert_eq!(password.expose(), "flag");
    }

    #[test]
    fn environment_used_when_flag_empty() {
        let password = resolve_password(&config("me"), Some(""), env_with(Some("env")))
            .unwrap()
            .unwrap();
        assert_eq!(password.expose(), "env");
    }

    #[test]
    fn missing_password_with_username_fails() {
        assert!(matches!(
            resolve_password(&config("me"), None, env_with(None)),
            Err(MailError::MissingPassword)
        ));
    }

    #[test]
    fn no_username_needs_no_password() {
        let resolved = resolve_password(&config(""), Some("ignored"), |_| None).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn debug_output_hides_secret() {
        assert_eq!(format!("{:?}", Password::new("hunter2")), "Password(***)");
    }
}
