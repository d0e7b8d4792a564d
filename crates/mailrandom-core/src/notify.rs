//! Announcing a selection: printed to the console or mailed.

use std::io::Write;

use tracing::debug;

use crate::error::Result;
use crate::mail::{MailConfig, OutgoingMessage, Password, send_email};

/// Category used when none is given.
pub const DEFAULT_CATEGORY: &str = "selection";

/// The sentence announcing a selection, also used as the mail subject.
#[must_use]
pub fn announcement(category: &str, selection: &str) -> String {
    format!("Today's {category} is: {selection}")
}

/// Where the selection goes.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Print one line to the given writer.
    Console,
    /// Send one message through an SMTP relay.
    Mail {
        /// Relay and envelope settings.
        config: MailConfig,
        /// Password, present when the relay requires AUTH.
        password: Option<Password>,
    },
}

impl Delivery {
    /// Announces `selection` under `category`.
    ///
    /// Console output goes to `out`; mail delivery ignores it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or mail delivery fails.
    pub async fn announce<W: Write>(
        &self,
        category: &str,
        selection: &str,
        out: &mut W,
    ) -> Result<()> {
        let text = announcement(category, selection);
        match self {
            Self::Console => {
                writeln!(out, "{text}")?;
                debug!("selection printed");
            }
            Self::Mail { config, password } => {
                let message = OutgoingMessage::new(
                    config.from.as_str(),
                    config.to.as_str(),
                    text.as_str(),
                    text.as_str(),
                );
                send_email(config, password.as_ref(), &message).await?;
            }
        }
        Ok(())
    }
}
