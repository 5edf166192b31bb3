//! Document parser: unfolded content lines into a component tree.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{parse_date, parse_datetime, parse_integer, unescape_text};
use crate::component::{Component, ComponentKind, ICalendar};
use crate::property::{ContentLine, Property};
use crate::value::{Date, DateTime, Value};

/// Parses an iCalendar document.
///
/// The root component must be a VCALENDAR.
///
/// ## Errors
/// Returns an error if the input is not structurally valid iCalendar.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    let lines = split_lines(input);
    if lines.is_empty() {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    }
    tracing::trace!(count = lines.len(), "unfolded content lines");

    let content_lines: Vec<(usize, ContentLine)> = lines
        .into_iter()
        .map(|(line_num, line)| parse_content_line(&line, line_num).map(|cl| (line_num, cl)))
        .collect::<ParseResult<_>>()?;

    let mut iter = content_lines.into_iter();

    let Some((line_num, begin)) = iter.next() else {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    };
    if begin.name != "BEGIN" {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1));
    }

    let root_name = begin.raw_value.to_ascii_uppercase();
    if root_name != "VCALENDAR" {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1)
            .with_context("expected VCALENDAR"));
    }

    let root = parse_component_body(&mut iter, line_num, &root_name)?;
    tracing::debug!(events = root.events().len(), "parsed iCalendar document");

    Ok(ICalendar { root })
}

/// Assembles one component whose BEGIN line was already consumed.
fn parse_component_body(
    iter: &mut impl Iterator<Item = (usize, ContentLine)>,
    begin_line_num: usize,
    component_name: &str,
) -> ParseResult<Component> {
    let mut component = Component {
        kind: Some(ComponentKind::parse(component_name)),
        name: component_name.to_string(),
        properties: Vec::new(),
        children: Vec::new(),
    };
    let mut last_line_num = begin_line_num;

    loop {
        let Some((line_num, content_line)) = iter.next() else {
            return Err(ParseError::new(ParseErrorKind::MissingEnd, last_line_num, 1)
                .with_context(format!("missing END:{component_name}")));
        };
        last_line_num = line_num;

        match content_line.name.as_str() {
            "BEGIN" => {
                let nested_name = content_line.raw_value.to_ascii_uppercase();
                let nested = parse_component_body(iter, line_num, &nested_name)?;
                component.children.push(nested);
            }
            "END" => {
                let end_name = content_line.raw_value.to_ascii_uppercase();
                if end_name != component_name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{component_name}, got END:{end_name}"
                            )),
                    );
                }
                return Ok(component);
            }
            _ => {
                component
                    .properties
                    .push(parse_property(content_line, line_num)?);
            }
        }
    }
}

/// Resolves a content line into a typed property.
fn parse_property(cl: ContentLine, line_num: usize) -> ParseResult<Property> {
    let value_type = determine_value_type(&cl);
    let tzid = cl.tzid().map(String::from);
    let value = parse_value(&cl.raw_value, value_type, tzid.as_deref(), line_num)?;

    Ok(Property {
        name: cl.name,
        params: cl.params,
        value,
        raw_value: cl.raw_value,
    })
}

/// Value kinds the parser distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Text,
    Integer,
    Date,
    DateTime,
    CalAddress,
    Recur,
    Unknown,
}

/// Picks the value type from the VALUE parameter or per-name defaults.
fn determine_value_type(cl: &ContentLine) -> ValueType {
    if let Some(explicit) = cl.value_type() {
        return match explicit.to_ascii_uppercase().as_str() {
            "TEXT" => ValueType::Text,
            "INTEGER" => ValueType::Integer,
            "DATE" => ValueType::Date,
            "DATE-TIME" => ValueType::DateTime,
            "CAL-ADDRESS" => ValueType::CalAddress,
            "RECUR" => ValueType::Recur,
            _ => ValueType::Unknown,
        };
    }

    match cl.name.as_str() {
        "DTSTART" | "DTEND" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "RECURRENCE-ID" => {
            // DATE form is legal without VALUE=DATE in lenient input
            if looks_like_date(&cl.raw_value) {
                ValueType::Date
            } else {
                ValueType::DateTime
            }
        }
        "EXDATE" | "RDATE" => {
            if cl
                .raw_value
                .split(',')
                .all(|part| looks_like_date(part.trim()))
            {
                ValueType::Date
            } else {
                ValueType::DateTime
            }
        }
        "SEQUENCE" | "PRIORITY" | "REPEAT" => ValueType::Integer,
        "RRULE" | "EXRULE" => ValueType::Recur,
        "ATTENDEE" | "ORGANIZER" => ValueType::CalAddress,
        _ => ValueType::Text,
    }
}

fn looks_like_date(s: &str) -> bool {
    s.len() == 8 && !s.contains('T') && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a raw value string into a typed [`Value`].
fn parse_value(
    raw: &str,
    value_type: ValueType,
    tzid: Option<&str>,
    line_num: usize,
) -> ParseResult<Value> {
    match value_type {
        ValueType::Text => Ok(Value::Text(unescape_text(raw))),
        ValueType::Integer => Ok(Value::Integer(parse_integer(raw, line_num, 1)?)),
        ValueType::Date => {
            if raw.contains(',') {
                let dates: Vec<Date> = raw
                    .split(',')
                    .map(|s| parse_date(s.trim(), line_num, 1))
                    .collect::<ParseResult<_>>()?;
                Ok(Value::DateList(dates))
            } else {
                Ok(Value::Date(parse_date(raw, line_num, 1)?))
            }
        }
        ValueType::DateTime => {
            if raw.contains(',') {
                let dts: Vec<DateTime> = raw
                    .split(',')
                    .map(|s| parse_datetime(s.trim(), tzid, line_num, 1))
                    .collect::<ParseResult<_>>()?;
                Ok(Value::DateTimeList(dts))
            } else {
                Ok(Value::DateTime(parse_datetime(raw, tzid, line_num, 1)?))
            }
        }
        ValueType::CalAddress => Ok(Value::CalAddress(raw.to_string())),
        ValueType::Recur => Ok(Value::Recur(raw.to_string())),
        ValueType::Unknown => Ok(Value::Unknown(raw.to_string())),
    }
}
