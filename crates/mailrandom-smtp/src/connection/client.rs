//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::{BodyType, Command};
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Type-state marker: greeting read, no transaction open.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker: authenticated, no transaction open.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker: `MAIL FROM` accepted.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker: at least one `RCPT TO` accepted.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker: `DATA` accepted, message body expected.
#[derive(Debug)]
pub struct Data;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Connected {}
    impl Sealed for super::Authenticated {}
}

/// States in which a new mail transaction may start.
pub trait ReadyForMail: sealed::Sealed {}
impl ReadyForMail for Connected {}
impl ReadyForMail for Authenticated {}

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or the server is not
    /// ready.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(Error::rejected(&greeting));
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        debug!(server = %hostname, "SMTP greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        self.hello(client_hostname).await?;
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised or the upgrade fails.
    pub async fn starttls(mut self, hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }
        self.expect(Command::StartTls, ReplyCode::is_success).await?;

        self.stream = self.stream.upgrade_to_tls(hostname).await?;
        debug!("connection upgraded to TLS");

        // Capabilities learned before the upgrade must be discarded.
        self.hello(hostname).await?;
        Ok(self)
    }

    /// Authenticates using the PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not advertise AUTH PLAIN or
    /// rejects the credentials.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        if !self
            .server_info
            .auth_mechanisms()
            .contains(&AuthMechanism::Plain)
        {
            return Err(Error::NotSupported("AUTH PLAIN".into()));
        }

        let credentials = format!("\0{username}\0{password}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
        self.expect(
            Command::Auth {
                mechanism: AuthMechanism::Plain,
                initial_response: Some(encoded),
            },
            ReplyCode::is_success,
        )
        .await?;

        Ok(self.transition())
    }

    async fn hello(&mut self, client_hostname: &str) -> Result<()> {
        let reply = self
            .expect(
                Command::Ehlo {
                    hostname: client_hostname.to_string(),
                },
                ReplyCode::is_success,
            )
            .await?;

        // First line is the server's greeting, the rest are extensions.
        self.server_info.extensions = reply
            .message
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(())
    }
}

impl<S: ReadyForMail> Client<S> {
    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(self, from: Address) -> Result<Client<MailTransaction>> {
        self.open_transaction(from, None).await
    }

    /// Starts a mail transaction declaring an 8-bit MIME body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if the server did not advertise
    /// 8BITMIME, or an error if the MAIL FROM command fails.
    pub async fn mail_from_8bitmime(self, from: Address) -> Result<Client<MailTransaction>> {
        if !self.server_info.supports_8bitmime() {
            return Err(Error::NotSupported("8BITMIME".into()));
        }
        self.open_transaction(from, Some(BodyType::EightBitMime))
            .await
    }

    async fn open_transaction(
        mut self,
        from: Address,
        body: Option<BodyType>,
    ) -> Result<Client<MailTransaction>> {
        self.expect(Command::MailFrom { from, body }, ReplyCode::is_success)
            .await?;
        Ok(self.transition())
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded>> {
        self.expect(Command::RcptTo { to }, ReplyCode::is_success)
            .await?;
        Ok(self.transition())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.expect(Command::RcptTo { to }, ReplyCode::is_success)
            .await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 354.
    pub async fn data(mut self) -> Result<Client<Data>> {
        self.expect(Command::Data, |code| code == ReplyCode::START_DATA)
            .await?;
        Ok(self.transition())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, lines starting with `.` are
    /// dot-stuffed and the terminating `.` line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails or the server rejects the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Connected>> {
        let encoded = encode_data(message);
        if let Some(limit) = self.server_info.max_message_size() {
            if limit > 0 && encoded.len() > limit {
                return Err(Error::Protocol(format!(
                    "message of {} bytes exceeds server limit of {limit}",
                    encoded.len()
                )));
            }
        }

        self.stream.write_all(&encoded).await?;
        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(Error::rejected(&reply));
        }
        debug!(bytes = encoded.len(), "message accepted");

        Ok(self.transition())
    }
}

// Common implementation for all states
impl<S> Client<S> {
    /// Returns what the server advertised.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true once the session runs over TLS.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.stream.is_encrypted()
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        self.expect(Command::Quit, |code| {
            code == ReplyCode::CLOSING || code.is_success()
        })
        .await?;
        Ok(())
    }

    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }

    async fn expect(&mut self, cmd: Command, accept: impl Fn(ReplyCode) -> bool) -> Result<Reply> {
        trace!(command = %cmd.redacted(), "C:");
        self.stream.write_all(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        trace!(code = %reply.code, "S:");

        if accept(reply.code) {
            Ok(reply)
        } else {
            Err(Error::rejected(&reply))
        }
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        let is_last = is_last_reply_line(&line);
        lines.push(line);
        if is_last {
            break;
        }
    }
    parse_reply(&lines)
}

/// Encodes a message for the DATA phase.
fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 16);
    let body = message.strip_suffix(b"\n").unwrap_or(message);
    let body = body.strip_suffix(b"\r").unwrap_or(body);

    if !body.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }

    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_normalizes_line_endings() {
        assert_eq!(
            encode_data(b"Subject: x\n\nbody\r\n"),
            b"Subject: x\r\n\r\nbody\r\n.\r\n"
        );
    }

    #[test]
    fn encode_dot_stuffs() {
        assert_eq!(encode_data(b".hidden\r\n..two"), b"..hidden\r\n...two\r\n.\r\n");
    }

    #[test]
    fn encode_empty_message() {
        assert_eq!(encode_data(b""), b".\r\n");
    }
}
