use std::fmt;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Classification of a parse failure.
///
/// Exactly one kind is reported per failure: the first problem encountered
/// while reading wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidToken,
    InvalidNumber,
    NoExpression,
    UnsupportedFeature,
    MultipleValues,
    InvalidEscape,
    UnterminatedString,
    InvalidKeyword,
    InvalidDiscard,
    InvalidCharacter,
    InvalidTag,
    UnterminatedCollection,
    DepthLimitExceeded,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidToken => "invalid token",
            ErrorKind::InvalidNumber => "invalid number",
            ErrorKind::NoExpression => "no expression",
            ErrorKind::UnsupportedFeature => "unsupported feature",
            ErrorKind::MultipleValues => "multiple values",
            ErrorKind::InvalidEscape => "invalid escape",
            ErrorKind::UnterminatedString => "unterminated string",
            ErrorKind::InvalidKeyword => "invalid keyword",
            ErrorKind::InvalidDiscard => "invalid discard",
            ErrorKind::InvalidCharacter => "invalid character",
            ErrorKind::InvalidTag => "invalid tag",
            ErrorKind::UnterminatedCollection => "unterminated collection",
            ErrorKind::DepthLimitExceeded => "nesting too deep",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parse failure, positioned in the input that produced it.
///
/// `offset` is a byte offset; `line` and `column` are 1-based, with columns
/// counted in characters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ErrorKind, input: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(input.len());
        let (line, column) = line_and_column(input, offset);
        Self {
            kind,
            offset,
            line,
            column,
            message: message.into(),
        }
    }
}

fn line_and_column(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in input.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_tracking() {
        let input = "[1\n  2\n  \"oops";
        let err = ParseError::new(ErrorKind::UnterminatedString, input, 9, "Unterminated string");
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 3);
        assert_eq!(err.offset, 9);
    }

    #[test]
    fn test_columns_count_characters() {
        let input = "\"Ωμ\" ?";
        let offset = input.find('?').unwrap();
        let err = ParseError::new(ErrorKind::InvalidToken, input, offset, "bad");
        assert_eq!((err.line, err.column), (1, 6));
    }

    #[test]
    fn test_offset_clamped_to_input() {
        let err = ParseError::new(ErrorKind::NoExpression, "", 10, "No value");
        assert_eq!(err.offset, 0);
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_display() {
        let err = ParseError::new(ErrorKind::InvalidDiscard, "#_", 0, "Discard with nothing to discard");
        assert_eq!(
            err.to_string(),
            "invalid discard at line 1, column 1: Discard with nothing to discard"
        );
    }
}
