//! # mailrandom-smtp
//!
//! A small async SMTP submission client implementing the subset of RFC 5321
//! needed to hand one message to a relay.
//!
//! ## Features
//!
//! - **Type-state session**: the compiler rejects out-of-order commands
//!   (no `DATA` before `RCPT TO`, no `AUTH` mid-transaction)
//! - **TLS**: implicit TLS (port 465) and STARTTLS upgrade
//! - **Authentication**: AUTH PLAIN with an initial response
//! - **8BITMIME**: `BODY=8BITMIME` when the relay accepts it
//! - **Timeouts**: every read and write is bounded
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailrandom_smtp::{Address, Client};
//! use mailrandom_smtp::connection::{DEFAULT_TIMEOUT, connect};
//!
//! #[tokio::main]
//! async fn main() -> mailrandom_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587, DEFAULT_TIMEOUT).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.starttls("smtp.example.com").await?;
//!     let client = client.auth_plain("me@example.com", "secret").await?;
//!
//!     let client = client.mail_from(Address::new("me@example.com")?).await?;
//!     let client = client.rcpt_to(Address::new("you@example.com")?).await?;
//!     let client = client.data().await?;
//!     let client = client.send_message(b"Subject: hi\r\n\r\nhello\r\n").await?;
//!     client.quit().await
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Connected ── auth_plain() ──→ Authenticated
//!     │                              │
//!     └──────── mail_from() ─────────┴──→ MailTransaction ── rcpt_to() ──→ RecipientAdded
//!                                                                              │
//!                       Connected ←── send_message() ── Data ←── data() ───────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, ReadyForMail, RecipientAdded,
    ServerInfo,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
