//! Reader for comma-separated records with standard quoting.
//!
//! Fields may be wrapped in double quotes; inside quotes, commas and line
//! breaks are literal and `""` stands for one quote. `\r\n` is read as `\n`
//! and blank lines are skipped.

use std::iter::Peekable;
use std::str::Chars;

use super::{FileError, FileResult};

/// One record and the line it starts on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Line the record starts on.
    pub line: usize,
    /// Field values with quoting removed.
    pub fields: Vec<String>,
}

/// Splits `input` into records.
///
/// # Errors
///
/// Returns [`FileError::MalformedRecord`] for an unterminated quoted field,
/// text after a closing quote, or a quote inside an unquoted field.
pub fn parse_records(input: &str) -> FileResult<Vec<Record>> {
    let normalized = input.strip_prefix('\u{feff}').unwrap_or(input).replace("\r\n", "\n");
    let mut reader = Reader {
        chars: normalized.chars().peekable(),
        line: 1,
    };

    let mut records = Vec::new();
    while let Some(&next) = reader.chars.peek() {
        if next == '\n' {
            reader.chars.next();
            reader.line += 1;
            continue;
        }
        let line = reader.line;
        let fields = reader.record()?;
        records.push(Record { line, fields });
    }
    Ok(records)
}

struct Reader<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

enum FieldEnd {
    Comma,
    Record,
}

impl Reader<'_> {
    fn record(&mut self) -> FileResult<Vec<String>> {
        let mut fields = Vec::new();
        loop {
            let (field, end) = if self.chars.peek() == Some(&'"') {
                self.chars.next();
                self.quoted()?
            } else {
                self.unquoted()?
            };
            fields.push(field);
            if matches!(end, FieldEnd::Record) {
                return Ok(fields);
            }
        }
    }

    fn quoted(&mut self) -> FileResult<(String, FieldEnd)> {
        let start = self.line;
        let mut field = String::new();
        loop {
            match self.chars.next() {
                None => return Err(malformed(start, "unterminated quoted field")),
                Some('"') if self.chars.peek() == Some(&'"') => {
                    self.chars.next();
                    field.push('"');
                }
                Some('"') => break,
                Some('\n') => {
                    self.line += 1;
                    field.push('\n');
                }
                Some(c) => field.push(c),
            }
        }

        match self.chars.next() {
            None => Ok((field, FieldEnd::Record)),
            Some(',') => Ok((field, FieldEnd::Comma)),
            Some('\n') => {
                self.line += 1;
                Ok((field, FieldEnd::Record))
            }
            Some(c) => Err(malformed(
                self.line,
                &format!("unexpected {c:?} after closing quote"),
            )),
        }
    }

    fn unquoted(&mut self) -> FileResult<(String, FieldEnd)> {
        let mut field = String::new();
        loop {
            match self.chars.next() {
                None => return Ok((field, FieldEnd::Record)),
                Some(',') => return Ok((field, FieldEnd::Comma)),
                Some('\n') => {
                    self.line += 1;
                    return Ok((field, FieldEnd::Record));
                }
                Some('"') => {
                    return Err(malformed(self.line, "bare \" in unquoted field"));
                }
                Some(c) => field.push(c),
            }
        }
    }
}

fn malformed(line: usize, reason: &str) -> FileError {
    FileError::MalformedRecord {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(input: &str) -> Vec<Vec<String>> {
        parse_records(input)
            .unwrap()
            .into_iter()
            .map(|record| record.fields)
            .collect()
    }

    #[test]
    fn plain_records() {
        assert_eq!(
            fields("swim,2\nrun,1\n"),
            vec![vec!["swim", "2"], vec!["run", "1"]]
        );
    }

    #[test]
    fn missing_final_newline_and_crlf() {
        assert_eq!(
            fields("a,1\r\nb,2"),
            vec![vec!["a", "1"], vec!["b", "2"]]
        );
    }

    #[test]
    fn quoted_fields() {
        assert_eq!(
            fields("\"Hello, world\",3\n\"say \"\"hi\"\"\",1\n"),
            vec![vec!["Hello, world", "3"], vec!["say \"hi\"", "1"]]
        );
    }

    #[test]
    fn quoted_field_spans_lines() {
        let records = parse_records("\"two\nlines\",1\nnext,2\n").unwrap();
        assert_eq!(records[0].fields, vec!["two\nlines", "1"]);
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn blank_lines_are_skipped_but_counted() {
        let records = parse_records("\n\na,1\n\r\nb,2\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 3);
        assert_eq!(records[1].line, 5);
    }

    #[test]
    fn empty_fields_are_kept() {
        assert_eq!(fields(",\n"), vec![vec!["", ""]]);
        assert_eq!(fields("a,1,\n"), vec![vec!["a", "1", ""]]);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        assert_eq!(fields("\u{feff}a,1\n"), vec![vec!["a", "1"]]);
    }

    #[test]
    fn malformed_quoting() {
        assert!(matches!(
            parse_records("ok,1\n\"open,2\n"),
            Err(FileError::MalformedRecord { line: 2, reason }) if reason == "unterminated quoted field"
        ));
        assert!(matches!(
            parse_records("\"a\"b,1\n"),
            Err(FileError::MalformedRecord { line: 1, .. })
        ));
        assert!(matches!(
            parse_records("a\"b,1\n"),
            Err(FileError::MalformedRecord { line: 1, .. })
        ));
    }
}
