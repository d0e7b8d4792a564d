//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from its lines.
///
/// Replies are single-line (`250 OK`) or multi-line, where every line but
/// the last uses `-` after the code (`250-first`, `250 last`). All lines must
/// carry the same code.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the reply is malformed.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let Some(first) = lines.first() else {
        return Err(Error::Protocol("empty reply".into()));
    };
    let code = reply_code(first)?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if reply_code(line)? != code {
            return Err(Error::Protocol(format!(
                "reply code changed mid-reply: {line}"
            )));
        }
        match line.as_bytes().get(3) {
            None => message.push(String::new()),
            Some(b' ' | b'-') => message.push(line[4..].to_string()),
            Some(_) => return Err(Error::Protocol(format!("malformed reply line: {line}"))),
        }
    }

    Ok(Reply::new(ReplyCode::new(code), message))
}

fn reply_code(line: &str) -> Result<u16> {
    let digits = line
        .get(0..3)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| Error::Protocol(format!("invalid reply code: {line}")))?;
    digits
        .parse()
        .map_err(|_| Error::Protocol(format!("invalid reply code: {line}")))
}

/// Checks if a line ends a (possibly multi-line) reply.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.len() == 3 || line.as_bytes().get(3) == Some(&b' ')
}
