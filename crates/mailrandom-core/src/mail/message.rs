//! Outgoing message composition.

use base64::Engine;
use chrono::{DateTime, FixedOffset, Local};

/// An email message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Value of the `Date` header.
    pub date: DateTime<FixedOffset>,
}

impl OutgoingMessage {
    /// Creates a message dated now.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            date: Local::now().fixed_offset(),
        }
    }

    /// Replaces the `Date` header value.
    #[must_use]
    pub fn with_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = date;
        self
    }

    /// Picks the body encoding: 7bit for ASCII text, 8bit when the relay
    /// advertised 8BITMIME, base64 otherwise.
    #[must_use]
    pub fn transfer_encoding(&self, eight_bit_mime: bool) -> TransferEncoding {
        if self.body.is_ascii() {
            TransferEncoding::SevenBit
        } else if eight_bit_mime {
            TransferEncoding::EightBit
        } else {
            TransferEncoding::Base64
        }
    }

    /// Builds the RFC 5322 formatted message with the body in `encoding`.
    #[must_use]
    pub fn to_rfc5322(&self, encoding: TransferEncoding) -> String {
        use std::fmt::Write;

        let mut message = String::new();

        let _ = write!(message, "From: {}\r\n", header_value(&self.from));
        let _ = write!(message, "To: {}\r\n", header_value(&self.to));
        let _ = write!(message, "Subject: {}\r\n", encode_words(&self.subject));
        let _ = write!(message, "Date: {}\r\n", self.date.to_rfc2822());
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        let _ = write!(
            message,
            "Content-Transfer-Encoding: {}\r\n",
            encoding.as_str()
        );

        // Empty line between headers and body
        message.push_str("\r\n");

        match encoding {
            TransferEncoding::SevenBit | TransferEncoding::EightBit => {
                message.push_str(&self.body);
                message.push_str("\r\n");
            }
            TransferEncoding::Base64 => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(self.body.as_bytes());
                for line in encoded.as_bytes().chunks(BASE64_LINE) {
                    // Base64 output is ASCII, so every chunk is valid UTF-8.
                    message.push_str(&String::from_utf8_lossy(line));
                    message.push_str("\r\n");
                }
            }
        }

        message
    }
}

/// `Content-Transfer-Encoding` of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// ASCII text.
    SevenBit,
    /// Raw UTF-8, only over a relay that accepts 8BITMIME.
    EightBit,
    /// UTF-8 wrapped in base64.
    Base64,
}

impl TransferEncoding {
    /// Header value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Base64 => "base64",
        }
    }
}

/// Base64 body line length (RFC 2045).
const BASE64_LINE: usize = 76;

/// Raw bytes per encoded-word: 45 bytes become 60 base64 characters, which
/// with the 12 characters of `=?utf-8?B?` and `?=` stays within 75.
const WORD_BYTES: usize = 45;

/// Header values are single-line; embedded line breaks become spaces.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// RFC 2047 encoded-words for non-ASCII header text, folded one per line.
fn encode_words(value: &str) -> String {
    let value = header_value(value);
    if value.is_ascii() {
        return value;
    }

    let mut words = Vec::new();
    let mut start = 0;
    let mut end = 0;
    for (index, ch) in value.char_indices() {
        let next = index + ch.len_utf8();
        if next - start > WORD_BYTES {
            words.push(encode_word(&value[start..end]));
            start = end;
        }
        end = next;
    }
    words.push(encode_word(&value[start..end]));
    words.join("\r\n ")
}

fn encode_word(chunk: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(chunk.as_bytes());
    format!("=?utf-8?B?{encoded}?=")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixed_date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc2822("Mon, 19 Oct 2026 08:30:00 +0000").unwrap()
    }

    fn subject_words(rendered: &str) -> Vec<String> {
        let start = rendered.find("Subject: ").unwrap() + "Subject: ".len();
        let end = rendered.find("\r\nDate: ").unwrap();
        rendered[start..end]
            .split("\r\n ")
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn renders_headers_and_body() {
        let message = OutgoingMessage::new(
            "me@example.com",
            "you@example.com",
            "Today's exercise is: squats",
            "Today's exercise is: squats",
        )
        .with_date(fixed_date());

        assert_eq!(message.transfer_encoding(false), TransferEncoding::SevenBit);
        assert_eq!(
            message.to_rfc5322(TransferEncoding::SevenBit),
            "From: me@example.com\r\n\
             To: you@example.com\r\n\
             Subject: Today's exercise is: squats\r\n\
             Date: Mon, 19 Oct 2026 08:30:00 +0000\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             Content-Transfer-Encoding: 7bit\r\n\
             \r\n\
             Today's exercise is: squats\r\n"
        );
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        assert_eq!(encode_words("café"), "=?utf-8?B?Y2Fmw6k=?=");
    }

    #[test]
    fn long_subject_splits_into_short_words() {
        let label = "é".repeat(50);
        let message = OutgoingMessage::new("a@b.c", "d@e.f", format!("Today's dish is: {label}"), "")
            .with_date(fixed_date());
        let words = subject_words(&message.to_rfc5322(TransferEncoding::SevenBit));

        assert_eq!(words.len(), 3);
        let mut decoded = Vec::new();
        for word in &words {
            assert!(word.len() <= 75, "{word} is {} characters", word.len());
            let payload = word
                .strip_prefix("=?utf-8?B?")
                .and_then(|w| w.strip_suffix("?="))
                .unwrap();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload)
                .unwrap();
            // Each word holds whole characters.
            assert!(String::from_utf8(bytes.clone()).is_ok());
            decoded.extend(bytes);
        }
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            format!("Today's dish is: {label}")
        );
    }

    #[test]
    fn non_ascii_body_follows_relay_capability() {
        let message = OutgoingMessage::new("a@b.c", "d@e.f", "crêpe", "Today's dish is: crêpe")
            .with_date(fixed_date());

        assert_eq!(message.transfer_encoding(true), TransferEncoding::EightBit);
        let eight_bit = message.to_rfc5322(TransferEncoding::EightBit);
        assert!(eight_bit.contains("Content-Transfer-Encoding: 8bit\r\n"));
        assert!(eight_bit.ends_with("\r\n\r\nToday's dish is: crêpe\r\n"));

        assert_eq!(message.transfer_encoding(false), TransferEncoding::Base64);
        let seven_bit = message.to_rfc5322(TransferEncoding::Base64);
        assert!(seven_bit.is_ascii());
        assert!(seven_bit.contains("Content-Transfer-Encoding: base64\r\n"));
        let body = seven_bit.split("\r\n\r\n").nth(1).unwrap().replace("\r\n", "");
        let decoded = base64::engine::general_purpose::STANDARD.decode(body).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "Today's dish is: crêpe");
    }

    #[test]
    fn base64_body_lines_are_wrapped() {
        let message = OutgoingMessage::new("a@b.c", "d@e.f", "s", "ü".repeat(100))
            .with_date(fixed_date());
        let rendered = message.to_rfc5322(TransferEncoding::Base64);
        let body = rendered.split("\r\n\r\n").nth(1).unwrap();
        assert!(body.split("\r\n").all(|line| line.len() <= 76));
    }

    #[test]
    fn line_breaks_cannot_inject_headers() {
        let message = OutgoingMessage::new("a@b.c", "d@e.f", "x\r\nBcc: evil@example.com", "")
            .with_date(fixed_date());
        let rendered = message.to_rfc5322(TransferEncoding::SevenBit);
        assert!(rendered.contains("Subject: x  Bcc: evil@example.com\r\n"));
        assert!(!rendered.contains("\r\nBcc:"));
    }
}
