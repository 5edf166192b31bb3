//! Parse error types with source positions.

/// What went wrong while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    MissingBegin,
    MissingEnd,
    MismatchedComponent,
    MissingPropertyName,
    InvalidPropertyName,
    InvalidParameter,
    UnclosedQuote,
    MissingColon,
    InvalidDate,
    InvalidTime,
    InvalidDateTime,
    InvalidInteger,
}

impl ParseErrorKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingBegin => "missing BEGIN",
            Self::MissingEnd => "missing END",
            Self::MismatchedComponent => "mismatched component",
            Self::MissingPropertyName => "missing property name",
            Self::InvalidPropertyName => "invalid property name",
            Self::InvalidParameter => "invalid parameter",
            Self::UnclosedQuote => "unclosed quote",
            Self::MissingColon => "missing ':' separator",
            Self::InvalidDate => "invalid DATE value",
            Self::InvalidTime => "invalid TIME value",
            Self::InvalidDateTime => "invalid DATE-TIME value",
            Self::InvalidInteger => "invalid INTEGER value",
        }
    }
}

/// An iCalendar parse error, pointing at the offending line.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} at line {line}, column {col}{}", kind.as_str(), context.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub col: usize,
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize, col: usize) -> Self {
        Self {
            kind,
            line,
            col,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
