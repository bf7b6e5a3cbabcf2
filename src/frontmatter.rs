//! Front-matter header parsing.
//!
//! A post may start with header lines of the form `%key: value`. The header
//! ends at the first line that does not start with `%`; everything after it is
//! the markdown body.
//!
//! ```text
//! %title: First Light
//! %date: 2023-03-14
//! %description: Notes from the first clear night of spring.
//!
//! The sky cleared just after nine.
//! ```
//!
//! Keys and values are trimmed. A later duplicate key overrides an earlier one.

use crate::types::{FRONT_MATTER_DATE_FORMAT, Properties};
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Marker that starts every header line.
pub const HEADER_MARKER: char = '%';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("header line {line} has no `:` separator: {text:?}")]
    MissingSeparator { line: usize, text: String },
    #[error("header line {line} has an empty key")]
    EmptyKey { line: usize },
    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Parsed header and where the body starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub properties: Properties,
    /// Byte offset of the first body character in the source text.
    pub body_offset: usize,
}

/// Parse the header block at the top of `text`.
///
/// Pure: returns the properties and the offset of the body, which is
/// `text[body_offset..]`. Text without header lines yields no properties
/// and offset 0.
pub fn parse_header(text: &str) -> Result<Header, HeaderError> {
    let mut properties = Properties::new();
    let mut offset = 0;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let Some(rest) = line.strip_prefix(HEADER_MARKER) else {
            break;
        };
        let content = rest.trim_end_matches(['\n', '\r']);
        let Some((key, value)) = content.split_once(':') else {
            return Err(HeaderError::MissingSeparator {
                line: index + 1,
                text: line.trim_end().to_string(),
            });
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(HeaderError::EmptyKey { line: index + 1 });
        }
        properties.insert(key.to_string(), value.trim().to_string());
        offset += line.len();
    }

    Ok(Header {
        properties,
        body_offset: offset,
    })
}

/// Resolve a post's publish date.
///
/// The front-matter `date` wins (midnight of that day); otherwise the
/// source file's modification time is used.
pub fn resolve_date(
    properties: &Properties,
    modified: NaiveDateTime,
) -> Result<NaiveDateTime, HeaderError> {
    match properties.get("date") {
        Some(value) => NaiveDate::parse_from_str(value, FRONT_MATTER_DATE_FORMAT)
            .map(|d| d.and_time(chrono::NaiveTime::MIN))
            .map_err(|_| HeaderError::InvalidDate {
                value: value.clone(),
            }),
        None => Ok(modified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::timestamp;

    #[test]
    fn parses_header_and_body_offset() {
        let text = "%title: Hello\n%date: 2024-01-05\n\nBody text\n";
        let header = parse_header(text).unwrap();

        assert_eq!(header.properties["title"], "Hello");
        assert_eq!(header.properties["date"], "2024-01-05");
        assert_eq!(&text[header.body_offset..], "\nBody text\n");
    }

    #[test]
    fn no_header() {
        let text = "# Just markdown\n%not: a header\n";
        let header = parse_header(text).unwrap();
        assert!(header.properties.is_empty());
        assert_eq!(header.body_offset, 0);
    }

    #[test]
    fn empty_text() {
        let header = parse_header("").unwrap();
        assert!(header.properties.is_empty());
        assert_eq!(header.body_offset, 0);
    }

    #[test]
    fn header_only_without_trailing_newline() {
        let text = "%title: Only";
        let header = parse_header(text).unwrap();
        assert_eq!(header.properties["title"], "Only");
        assert_eq!(header.body_offset, text.len());
        assert_eq!(&text[header.body_offset..], "");
    }

    #[test]
    fn value_keeps_later_colons() {
        let header = parse_header("%link: https://example.com:8080/x\n").unwrap();
        assert_eq!(header.properties["link"], "https://example.com:8080/x");
    }

    #[test]
    fn trims_keys_values_and_crlf() {
        let text = "%  title :  Spaced out  \r\nbody";
        let header = parse_header(text).unwrap();
        assert_eq!(header.properties["title"], "Spaced out");
        assert_eq!(&text[header.body_offset..], "body");
    }

    #[test]
    fn later_duplicate_wins() {
        let header = parse_header("%title: one\n%title: two\n").unwrap();
        assert_eq!(header.properties["title"], "two");
    }

    #[test]
    fn empty_value_allowed() {
        let header = parse_header("%draft:\n").unwrap();
        assert_eq!(header.properties["draft"], "");
    }

    #[test]
    fn missing_separator_is_error() {
        let err = parse_header("%title: ok\n%broken line\nbody").unwrap_err();
        assert_eq!(
            err,
            HeaderError::MissingSeparator {
                line: 2,
                text: "%broken line".to_string()
            }
        );
    }

    #[test]
    fn empty_key_is_error() {
        let err = parse_header("%: value\n").unwrap_err();
        assert_eq!(err, HeaderError::EmptyKey { line: 1 });
    }

    // =========================================================================
    // resolve_date
    // =========================================================================

    #[test]
    fn date_from_front_matter() {
        let mut props = Properties::new();
        props.insert("date".into(), "2023-03-14".into());
        let mtime = timestamp("2025-01-01 12:00:00");

        assert_eq!(
            resolve_date(&props, mtime).unwrap(),
            timestamp("2023-03-14 00:00:00")
        );
    }

    #[test]
    fn date_falls_back_to_mtime() {
        let mtime = timestamp("2025-01-01 12:34:56");
        assert_eq!(resolve_date(&Properties::new(), mtime).unwrap(), mtime);
    }

    #[test]
    fn invalid_date_is_error() {
        let mut props = Properties::new();
        props.insert("date".into(), "March 14".into());
        let err = resolve_date(&props, timestamp("2025-01-01 00:00:00")).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidDate { .. }));
    }
}
