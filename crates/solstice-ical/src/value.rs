//! Typed property values (RFC 5545 §3.3).

/// A DATE value (RFC 5545 §3.3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    /// Creates a date from a chrono naive date.
    #[must_use]
    pub fn from_naive(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: u16::try_from(date.year()).unwrap_or(0),
            month: u8::try_from(date.month()).unwrap_or(1),
            day: u8::try_from(date.day()).unwrap_or(1),
        }
    }

    /// Converts to a chrono naive date, if the fields form a real date.
    #[must_use]
    pub fn to_naive(self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// A TIME value (RFC 5545 §3.3.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Whether the time carried a 'Z' suffix.
    pub is_utc: bool,
}

/// The reference frame of a DATE-TIME value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeForm {
    /// Absolute UTC time ('Z' suffix).
    Utc,
    /// Local time with no timezone reference.
    Floating,
    /// Local time interpreted in the timezone named by a TZID parameter.
    Zoned { tzid: String },
}

/// A DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a UTC datetime.
    #[must_use]
    pub const fn utc(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            form: DateTimeForm::Utc,
        }
    }

    /// Creates a floating (timezone-less) datetime.
    #[must_use]
    pub const fn floating(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            form: DateTimeForm::Floating,
        }
    }

    /// Creates a datetime from an absolute chrono UTC instant.
    #[must_use]
    pub fn from_utc(dt: chrono::DateTime<chrono::Utc>) -> Self {
        use chrono::{Datelike, Timelike};
        Self {
            year: u16::try_from(dt.year()).unwrap_or(0),
            month: u8::try_from(dt.month()).unwrap_or(1),
            day: u8::try_from(dt.day()).unwrap_or(1),
            hour: u8::try_from(dt.hour()).unwrap_or(0),
            minute: u8::try_from(dt.minute()).unwrap_or(0),
            second: u8::try_from(dt.second()).unwrap_or(0),
            form: DateTimeForm::Utc,
        }
    }

    /// Converts the wall-clock fields to a chrono naive datetime.
    ///
    /// The form (UTC/floating/zoned) is not applied; callers interpret the
    /// result against the timezone the form names.
    #[must_use]
    pub fn to_naive(&self) -> Option<chrono::NaiveDateTime> {
        let date = chrono::NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?;
        let time = chrono::NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )?;
        Some(chrono::NaiveDateTime::new(date, time))
    }

    #[must_use]
    pub fn is_utc(&self) -> bool {
        self.form == DateTimeForm::Utc
    }

    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.form == DateTimeForm::Floating
    }

    /// Returns the TZID if this is a zoned datetime.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            DateTimeForm::Utc | DateTimeForm::Floating => None,
        }
    }
}

impl std::fmt::Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}{}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            if self.is_utc() { "Z" } else { "" }
        )
    }
}

/// A parsed property value.
///
/// Recurrence rules are carried as raw RECUR text; rule semantics belong to
/// the external recurrence engine, not the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i32),
    Date(Date),
    DateTime(DateTime),
    /// Comma-separated DATE-TIME list (EXDATE, RDATE).
    DateTimeList(Vec<DateTime>),
    /// Comma-separated DATE list.
    DateList(Vec<Date>),
    /// mailto: URI of ORGANIZER/ATTENDEE.
    CalAddress(String),
    /// Raw RECUR rule text.
    Recur(String),
    /// Unrecognized value kept verbatim.
    Unknown(String),
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime_list(&self) -> Option<&[DateTime]> {
        match self {
            Self::DateTimeList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date_list(&self) -> Option<&[Date]> {
        match self {
            Self::DateList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_cal_address(&self) -> Option<&str> {
        match self {
            Self::CalAddress(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&str> {
        match self {
            Self::Recur(s) => Some(s),
            _ => None,
        }
    }
}
