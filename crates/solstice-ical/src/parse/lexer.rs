//! Content line lexer (RFC 5545 §3.1): unfolding and tokenization.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::parameter::Parameter;
use crate::property::ContentLine;

/// Splits input into unfolded content lines with their 1-based line numbers.
///
/// Lines starting with SP/HTAB are continuations of the previous line; the
/// line break and the single leading whitespace character are removed
/// (RFC 5545 §3.1). Handles CRLF and bare LF, skips empty lines.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some((_, prev)) = lines.last_mut() {
                prev.push_str(continuation);
            } else {
                lines.push((i + 1, continuation.to_string()));
            }
        } else {
            lines.push((i + 1, line.to_string()));
        }
    }

    lines
}

/// Parses one unfolded content line: `name *(";" param) ":" value`.
///
/// ## Errors
/// Returns an error if the line has no name, no ':' separator, or a
/// malformed parameter.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut chars = line.char_indices().peekable();

    // Property name runs to the first ';' or ':'.
    let mut name_end = None;
    let mut at_colon = false;
    while let Some(&(i, c)) = chars.peek() {
        if c == ';' || c == ':' {
            name_end = Some(i);
            at_colon = c == ':';
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidPropertyName,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    let name_end = name_end
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, line.len()))?;
    if name_end == 0 {
        return Err(ParseError::new(
            ParseErrorKind::MissingPropertyName,
            line_num,
            1,
        ));
    }
    let name = line[..name_end].to_ascii_uppercase();

    let mut params = Vec::new();
    while !at_colon {
        let (param, reached_colon) = parse_parameter(&mut chars, line, line_num)?;
        params.push(param);
        at_colon = reached_colon;
    }

    // Value is everything after the ':' just consumed.
    let value_start = chars.peek().map_or(line.len(), |&(i, _)| i);
    let value = &line[value_start..];

    Ok(ContentLine {
        name,
        params,
        raw_value: value.to_string(),
    })
}

/// Parses one `NAME=value(,value)*` parameter.
///
/// Returns the parameter and whether the terminating delimiter was ':'.
fn parse_parameter(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<(Parameter, bool)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    // Name runs to '='.
    let mut name_end = None;
    while let Some(&(i, c)) = chars.peek() {
        if c == '=' {
            name_end = Some(i);
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidParameter,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }
    let name_end =
        name_end.ok_or_else(|| ParseError::new(ParseErrorKind::MissingColon, line_num, start))?;
    if name_end == start {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            start + 1,
        ));
    }
    let name = &line[start..name_end];

    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter::with_values(name, values), false)),
            Some((_, ':')) => return Ok((Parameter::with_values(name, values), true)),
            Some((i, c)) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len(),
                ));
            }
        }
    }
}

/// Parses one parameter value, which may be quoted.
///
/// Quoted values support RFC 6868 caret decoding (`^^`, `^n`, `^'`).
fn parse_param_value(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            line.len(),
        ));
    };

    if first == '"' {
        chars.next();
        let mut value = String::new();
        let mut closed = false;

        while let Some((_, c)) = chars.next() {
            match c {
                '"' => {
                    closed = true;
                    break;
                }
                '^' => match chars.peek().map(|&(_, next)| next) {
                    Some('^') => {
                        value.push('^');
                        chars.next();
                    }
                    Some('n') => {
                        value.push('\n');
                        chars.next();
                    }
                    Some('\'') => {
                        value.push('"');
                        chars.next();
                    }
                    _ => value.push('^'),
                },
                other => value.push(other),
            }
        }

        if !closed {
            return Err(ParseError::new(
                ParseErrorKind::UnclosedQuote,
                line_num,
                start + 1,
            ));
        }
        Ok(value)
    } else {
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c == ',' || c == ';' || c == ':' {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        Ok(line[start..end].to_string())
    }
}
