//! Properties and content lines (RFC 5545 §3.1, §3.8).

use crate::parameter::Parameter;
use crate::value::{Date, DateTime, Value};

/// A raw content line, before value type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
}

impl ContentLine {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.into(),
        }
    }

    /// Returns the value of the named parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        let name_upper = name.to_ascii_uppercase();
        self.params
            .iter()
            .find(|p| p.name == name_upper)
            .and_then(Parameter::value)
    }

    /// Returns the VALUE parameter if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.get_param_value("VALUE")
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }
}

/// A fully parsed property.
///
/// The original raw value is preserved for round-trip fidelity.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Parsed value.
    pub value: Value,
    /// Original raw value string.
    pub raw_value: String,
}

impl Property {
    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value_str = value.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Text(value_str.clone()),
            raw_value: value_str,
        }
    }

    /// Creates a property with an integer value.
    #[must_use]
    pub fn integer(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Integer(value),
            raw_value: value.to_string(),
        }
    }

    /// Creates a property with a datetime value.
    #[must_use]
    pub fn datetime(name: impl Into<String>, dt: DateTime) -> Self {
        let raw = dt.to_string();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::DateTime(dt),
            raw_value: raw,
        }
    }

    /// Creates a property with a date value, carrying `VALUE=DATE`.
    #[must_use]
    pub fn date(name: impl Into<String>, d: Date) -> Self {
        let raw = d.to_string();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: vec![Parameter::value_type("DATE")],
            value: Value::Date(d),
            raw_value: raw,
        }
    }

    /// Creates a property with a cal-address (mailto) value.
    #[must_use]
    pub fn cal_address(name: impl Into<String>, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::CalAddress(uri.clone()),
            raw_value: uri,
        }
    }

    /// Creates a property with a raw recurrence rule value.
    #[must_use]
    pub fn recur(name: impl Into<String>, rule: impl Into<String>) -> Self {
        let rule = rule.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Recur(rule.clone()),
            raw_value: rule,
        }
    }

    /// Adds a parameter to this property.
    pub fn add_param(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Builder-style variant of [`Self::add_param`].
    #[must_use]
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Returns the value of the named parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        let name_upper = name.to_ascii_uppercase();
        self.params
            .iter()
            .find(|p| p.name == name_upper)
            .and_then(Parameter::value)
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        self.value.as_integer()
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        self.value.as_datetime()
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        self.value.as_date()
    }
}

/// Property names consumed by the event core.
pub mod names {
    pub const VERSION: &str = "VERSION";
    pub const PRODID: &str = "PRODID";
    pub const CALSCALE: &str = "CALSCALE";
    pub const METHOD: &str = "METHOD";

    pub const UID: &str = "UID";
    pub const CREATED: &str = "CREATED";
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    pub const DTSTART: &str = "DTSTART";
    pub const DTEND: &str = "DTEND";
    pub const SEQUENCE: &str = "SEQUENCE";
    pub const SUMMARY: &str = "SUMMARY";
    pub const LOCATION: &str = "LOCATION";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const STATUS: &str = "STATUS";
    pub const TRANSP: &str = "TRANSP";

    pub const RRULE: &str = "RRULE";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    pub const EXDATE: &str = "EXDATE";

    pub const ORGANIZER: &str = "ORGANIZER";
    pub const ATTENDEE: &str = "ATTENDEE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_line_params() {
        let cl = ContentLine {
            name: "DTSTART".into(),
            params: vec![Parameter::tzid("America/New_York")],
            raw_value: "20240123T120000".into(),
        };
        assert_eq!(cl.tzid(), Some("America/New_York"));
        assert_eq!(cl.value_type(), None);
    }

    #[test]
    fn property_text() {
        let prop = Property::text("summary", "Meeting");
        assert_eq!(prop.name, "SUMMARY");
        assert_eq!(prop.as_text(), Some("Meeting"));
        assert_eq!(prop.raw_value, "Meeting");
    }

    #[test]
    fn property_date_carries_value_param() {
        let prop = Property::date(
            "DTSTART",
            Date {
                year: 2024,
                month: 1,
                day: 1,
            },
        );
        assert_eq!(prop.get_param_value("VALUE"), Some("DATE"));
        assert_eq!(prop.raw_value, "20240101");
    }
}
