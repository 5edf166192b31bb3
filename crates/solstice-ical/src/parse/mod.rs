//! iCalendar stream parsing: lexing, value typing, component assembly.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::parse;
