//! Property parameters (RFC 5545 §3.2).

/// A property parameter such as `TZID=Europe/Zurich` or `PARTSTAT=ACCEPTED`.
///
/// Parameters may carry multiple comma-separated values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Values in order of appearance.
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a single-valued parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a parameter with multiple values.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Creates a TZID parameter.
    #[must_use]
    pub fn tzid(identifier: impl Into<String>) -> Self {
        Self::new("TZID", identifier)
    }

    /// Creates a VALUE type parameter.
    #[must_use]
    pub fn value_type(kind: impl Into<String>) -> Self {
        Self::new("VALUE", kind)
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}
