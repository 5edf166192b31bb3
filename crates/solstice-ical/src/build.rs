//! Serialization back to the wire format: escaping, folding, writing.

use crate::component::{Component, ICalendar};
use crate::parameter::Parameter;
use crate::property::Property;
use crate::value::Value;

/// Maximum line length in octets, excluding the CRLF (RFC 5545 §3.1).
const FOLD_WIDTH: usize = 75;

/// Escapes a TEXT value (RFC 5545 §3.3.11).
///
/// Backslash, semicolon and comma gain a backslash; newlines become `\n`.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ';' => result.push_str("\\;"),
            ',' => result.push_str("\\,"),
            '\n' => result.push_str("\\n"),
            '\r' => {}
            other => result.push(other),
        }
    }
    result
}

/// Encodes a parameter value, quoting and caret-escaping as needed.
///
/// Values containing `:`, `;` or `,` are quoted (RFC 5545 §3.2); embedded
/// double quotes and newlines use RFC 6868 caret encoding.
#[must_use]
fn encode_param_value(s: &str) -> String {
    let needs_caret = s.contains(['^', '"', '\n']);
    let encoded = if needs_caret {
        let mut out = String::with_capacity(s.len() + 4);
        for c in s.chars() {
            match c {
                '^' => out.push_str("^^"),
                '"' => out.push_str("^'"),
                '\n' => out.push_str("^n"),
                '\r' => {}
                other => out.push(other),
            }
        }
        out
    } else {
        s.to_string()
    };

    if encoded.contains([':', ';', ',']) {
        format!("\"{encoded}\"")
    } else {
        encoded
    }
}

/// Folds a logical line at the 75-octet boundary (RFC 5545 §3.1).
///
/// Splits respect UTF-8 character boundaries; continuation lines begin with
/// a single space and the break itself is CRLF.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_WIDTH {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / FOLD_WIDTH * 3);
    let mut budget = FOLD_WIDTH;
    let mut current = 0;

    for c in line.chars() {
        let width = c.len_utf8();
        if current + width > budget {
            result.push_str("\r\n ");
            // Continuation lines lose one octet to the leading space.
            budget = FOLD_WIDTH - 1;
            current = 0;
        }
        result.push(c);
        current += width;
    }

    result
}

fn serialize_value(value: &Value, raw_value: &str) -> String {
    match value {
        Value::Text(s) => escape_text(s),
        Value::Integer(i) => i.to_string(),
        Value::Date(d) => d.to_string(),
        Value::DateTime(dt) => dt.to_string(),
        Value::DateTimeList(list) => list
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::DateList(list) => list
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::CalAddress(s) | Value::Recur(s) => s.clone(),
        Value::Unknown(_) => raw_value.to_string(),
    }
}

fn serialize_parameter(param: &Parameter) -> String {
    let values = param
        .values
        .iter()
        .map(|v| encode_param_value(v))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}={values}", param.name)
}

/// Serializes one property as a folded content line ending in CRLF.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();
    for param in &prop.params {
        line.push(';');
        line.push_str(&serialize_parameter(param));
    }
    line.push(':');
    line.push_str(&serialize_value(&prop.value, &prop.raw_value));

    let mut folded = fold_line(&line);
    folded.push_str("\r\n");
    folded
}

/// Serializes a component with its BEGIN/END frame and nested children.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut out = String::new();
    out.push_str("BEGIN:");
    out.push_str(&component.name);
    out.push_str("\r\n");

    for prop in &component.properties {
        out.push_str(&serialize_property(prop));
    }
    for child in &component.children {
        out.push_str(&serialize_component(child));
    }

    out.push_str("END:");
    out.push_str(&component.name);
    out.push_str("\r\n");
    out
}

/// Serializes a whole iCalendar document.
#[must_use]
pub fn serialize(ical: &ICalendar) -> String {
    serialize_component(&ical.root)
}
