//! Value parsers for the types the event core consumes (RFC 5545 §3.3).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::value::{Date, DateTime, DateTimeForm, Time};

fn digits<T: std::str::FromStr>(
    s: &str,
    kind: ParseErrorKind,
    line: usize,
    col: usize,
) -> ParseResult<T> {
    s.parse::<T>()
        .map_err(|_| ParseError::new(kind, line, col))
}

/// Parses a DATE value: `YYYYMMDD`.
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<Date> {
    if s.len() != 8 || !s.is_ascii() {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col));
    }

    let year = digits::<u16>(&s[0..4], ParseErrorKind::InvalidDate, line, col)?;
    let month = digits::<u8>(&s[4..6], ParseErrorKind::InvalidDate, line, col)?;
    let day = digits::<u8>(&s[6..8], ParseErrorKind::InvalidDate, line, col)?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, col));
    }

    Ok(Date { year, month, day })
}

/// Parses a TIME value: `HHMMSS[Z]`.
///
/// ## Errors
/// Returns an error if the string is not a valid 6-digit time.
pub fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<Time> {
    let (time_str, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };

    if time_str.len() != 6 || !time_str.is_ascii() {
        return Err(ParseError::new(ParseErrorKind::InvalidTime, line, col));
    }

    let hour = digits::<u8>(&time_str[0..2], ParseErrorKind::InvalidTime, line, col)?;
    let minute = digits::<u8>(&time_str[2..4], ParseErrorKind::InvalidTime, line, col)?;
    let second = digits::<u8>(&time_str[4..6], ParseErrorKind::InvalidTime, line, col)?;

    // 60 allowed for leap seconds
    if hour > 23 || minute > 59 || second > 60 {
        return Err(ParseError::new(ParseErrorKind::InvalidTime, line, col));
    }

    Ok(Time {
        hour,
        minute,
        second,
        is_utc,
    })
}

/// Parses a DATE-TIME value: `YYYYMMDD"T"HHMMSS[Z]`.
///
/// The TZID parameter, when present on the enclosing property, selects the
/// zoned form; a 'Z' suffix wins over TZID per RFC 5545.
///
/// ## Errors
/// Returns an error if either half is malformed.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let t_pos = s
        .find('T')
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidDateTime, line, col))?;

    let date = parse_date(&s[..t_pos], line, col)?;
    let time = parse_time(&s[t_pos + 1..], line, col + t_pos + 1)?;

    let form = if time.is_utc {
        DateTimeForm::Utc
    } else if let Some(tz) = tzid {
        DateTimeForm::Zoned {
            tzid: tz.to_string(),
        }
    } else {
        DateTimeForm::Floating
    };

    Ok(DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        hour: time.hour,
        minute: time.minute,
        second: time.second,
        form,
    })
}

/// Parses an INTEGER value.
///
/// ## Errors
/// Returns an error if the string is not a valid i32.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    digits::<i32>(s, ParseErrorKind::InvalidInteger, line, col)
}

/// Unescapes TEXT values (RFC 5545 §3.3.11): `\\ \, \; \n \N`.
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(',') => result.push(','),
                Some(';') => result.push(';'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    // Invalid escape, preserve as-is
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
