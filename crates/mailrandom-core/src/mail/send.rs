//! SMTP delivery of a composed message.

use std::net::IpAddr;

use mailrandom_smtp::connection::{connect, connect_tls};
use mailrandom_smtp::{Address, Client, ReadyForMail};
use tracing::{debug, info};

use super::config::{MailConfig, Security};
use super::credentials::Password;
use super::message::{OutgoingMessage, TransferEncoding};

/// Hostname announced in EHLO.
const CLIENT_HOSTNAME: &str = "localhost";

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Credentials would travel in clear text to a remote host.
    #[error("Refusing to authenticate to {0} over an unencrypted connection")]
    InsecureAuth(String),

    /// Send failed.
    #[error("Send failed: {0}")]
    Send(String),

    /// Invalid address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A username is configured but no password was supplied.
    #[error(
        "SMTP authentication password required: use the -p flag or the MAIL_PASS environment variable"
    )]
    MissingPassword,
}

/// Send `message` through the relay described by `config`.
///
/// Authenticates with AUTH PLAIN when the configuration has a username.
///
/// # Errors
///
/// Returns an error if connection, authentication, or sending fails.
pub async fn send_email(
    config: &MailConfig,
    password: Option<&Password>,
    message: &OutgoingMessage,
) -> Result<(), MailError> {
    let from = Address::new(message.from.as_str())
        .map_err(|e| MailError::InvalidAddress(e.to_string()))?;
    let to =
        Address::new(message.to.as_str()).map_err(|e| MailError::InvalidAddress(e.to_string()))?;
    let credentials = if config.requires_auth() {
        Some(password.ok_or(MailError::MissingPassword)?)
    } else {
        None
    };

    info!(server = %config.server, port = config.port, "sending selection by mail");

    // Connect based on security mode
    let stream = match config.security {
        Security::Tls => connect_tls(&config.server, config.port, config.timeout()).await,
        Security::Auto | Security::StartTls | Security::None => {
            connect(&config.server, config.port, config.timeout()).await
        }
    }
    .map_err(|e| MailError::Connection(e.to_string()))?;

    let client = Client::from_stream(stream)
        .await
        .map_err(|e| MailError::Connection(e.to_string()))?
        .ehlo(CLIENT_HOSTNAME)
        .await
        .map_err(|e| MailError::Connection(e.to_string()))?;

    let upgrade = match config.security {
        Security::StartTls => true,
        Security::Auto => client.server_info().supports_starttls(),
        Security::Tls | Security::None => false,
    };
    let client = if upgrade {
        client
            .starttls(&config.server)
            .await
            .map_err(|e| MailError::Connection(e.to_string()))?
    } else {
        client
    };
    debug!(encrypted = client.is_encrypted(), "session established");

    let Some(password) = credentials else {
        return transact(client, from, to, message).await;
    };

    if !client.is_encrypted() && !is_loopback(&config.server) {
        return Err(MailError::InsecureAuth(config.server.clone()));
    }
    let client = client
        .auth_plain(&config.username, password.expose())
        .await
        .map_err(|e| MailError::Authentication(e.to_string()))?;
    transact(client, from, to, message).await
}

/// Runs one mail transaction and closes the session.
async fn transact<S: ReadyForMail>(
    client: Client<S>,
    from: Address,
    to: Address,
    message: &OutgoingMessage,
) -> Result<(), MailError> {
    let encoding = message.transfer_encoding(client.server_info().supports_8bitmime());
    let client = match encoding {
        TransferEncoding::EightBit => client.mail_from_8bitmime(from).await,
        TransferEncoding::SevenBit | TransferEncoding::Base64 => client.mail_from(from).await,
    }
    .map_err(|e| MailError::Send(e.to_string()))?;
    debug!(encoding = encoding.as_str(), "transaction opened");

    let client = client
        .rcpt_to(to)
        .await
        .map_err(|e| MailError::Send(e.to_string()))?
        .data()
        .await
        .map_err(|e| MailError::Send(e.to_string()))?;

    let client = client
        .send_message(message.to_rfc5322(encoding).as_bytes())
        .await
        .map_err(|e| MailError::Send(e.to_string()))?;

    client
        .quit()
        .await
        .map_err(|e| MailError::Send(e.to_string()))?;

    info!(to = %message.to, "selection mailed");
    Ok(())
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost")
        || host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_hosts() {
        assert!(is_loopback("localhost"));
        assert!(is_loopback("127.0.0.1"));
        assert!(is_loopback("[::1]"));
        assert!(!is_loopback("smtp.example.com"));
        assert!(!is_loopback("10.0.0.1"));
    }
}
