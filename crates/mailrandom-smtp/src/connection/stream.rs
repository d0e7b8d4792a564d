//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore},
};

/// Bound applied to connecting and to every read or write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
enum Transport {
    Tcp(BufReader<TcpStream>),
    Tls(Box<BufReader<TlsStream<TcpStream>>>),
}

/// SMTP stream (TCP or TLS) with an I/O timeout.
#[derive(Debug)]
pub struct SmtpStream {
    transport: Transport,
    timeout: Duration,
}

impl SmtpStream {
    /// Returns true once the stream is TLS-protected.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        matches!(self.transport, Transport::Tls(_))
    }

    /// Reads one line, with the line terminator stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails, times out, or the server closed
    /// the connection.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = match &mut self.transport {
            Transport::Tcp(reader) => bounded(self.timeout, reader.read_line(&mut line)).await?,
            Transport::Tls(reader) => bounded(self.timeout, reader.read_line(&mut line)).await?,
        };
        if read == 0 {
            return Err(Error::Protocol("connection closed by server".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Writes data to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or times out.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.transport {
            Transport::Tcp(reader) => {
                let stream = reader.get_mut();
                bounded(self.timeout, async {
                    stream.write_all(data).await?;
                    stream.flush().await
                })
                .await
            }
            Transport::Tls(reader) => {
                let stream = reader.get_mut();
                bounded(self.timeout, async {
                    stream.write_all(data).await?;
                    stream.flush().await
                })
                .await
            }
        }
    }

    /// Upgrades a TCP stream to TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted or the handshake
    /// fails.
    pub async fn upgrade_to_tls(self, hostname: &str) -> Result<Self> {
        let tcp_stream = match self.transport {
            Transport::Tcp(reader) => reader.into_inner(),
            Transport::Tls(_) => return Err(Error::Protocol("already using TLS".into())),
        };
        let tls_stream = handshake(hostname, tcp_stream, self.timeout).await?;
        Ok(Self {
            transport: Transport::Tls(Box::new(BufReader::new(tls_stream))),
            timeout: self.timeout,
        })
    }
}

/// Connects to an SMTP server over plain TCP.
///
/// `timeout` bounds the connect and every later read or write;
/// [`DEFAULT_TIMEOUT`] suits most relays.
///
/// # Errors
///
/// Returns an error if the connection fails or times out.
pub async fn connect(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = bounded(timeout, TcpStream::connect((hostname, port))).await?;
    Ok(SmtpStream {
        transport: Transport::Tcp(BufReader::new(stream)),
        timeout,
    })
}

/// Connects to an SMTP server over TLS (implicit TLS, usually port 465).
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub async fn connect_tls(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let tcp_stream = bounded(timeout, TcpStream::connect((hostname, port))).await?;
    let tls_stream = handshake(hostname, tcp_stream, timeout).await?;
    Ok(SmtpStream {
        transport: Transport::Tls(Box::new(BufReader::new(tls_stream))),
        timeout,
    })
}

async fn handshake(
    hostname: &str,
    tcp_stream: TcpStream,
    timeout: Duration,
) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::Protocol(format!("invalid hostname: {hostname}")))?;
    bounded(timeout, create_tls_connector().connect(server_name, tcp_stream)).await
}

async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = std::io::Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::Timeout(timeout))?
        .map_err(Error::from)
}

/// Creates a TLS connector trusting the webpki root set.
fn create_tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}
