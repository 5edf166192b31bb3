//! iCalendar (RFC 5545) grammar support: parsing, the component model,
//! serialization, and timezone resolution.
//!
//! This crate stops at the grammar. Event semantics (materialization,
//! recurrence expansion, merging) live in `solstice-event`.

pub mod build;
pub mod component;
pub mod parameter;
pub mod parse;
pub mod property;
pub mod timezone;
pub mod value;

pub use build::{escape_text, fold_line, serialize, serialize_component, serialize_property};
pub use component::{Component, ComponentKind, ICalendar};
pub use parameter::Parameter;
pub use parse::{ParseError, ParseErrorKind, ParseResult, parse};
pub use property::{ContentLine, Property, names};
pub use timezone::TimeZoneResolver;
pub use value::{Date, DateTime, DateTimeForm, Time, Value};
