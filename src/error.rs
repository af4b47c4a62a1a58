use std::fmt;
use thiserror::Error;

/// Zero-based location in the source, counted in characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line: {} column: {} index: {}",
            self.line, self.column, self.index
        )
    }
}

/// What went wrong, without the location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Unexpected character \"{}\"", char_name(.0))]
    UnexpectedCharacter(char),
    #[error("Expected \"lf\"")]
    ExpectedLineFeed,
    #[error("Unescaped double quote, expected '\"'")]
    UnescapedQuote,
    #[error("Unterminated escaped field")]
    UnterminatedField,
    #[error("Invalid amount of fields in record: {0}")]
    FieldCount(usize),
}

/// A fatal syntax error. There is no recovery; the parse call that produced
/// it returns nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {position}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub position: Position,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Error type returned by this crate when not using `anyhow`.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Invalid delimiter: {0:?}")]
    InvalidDelimiter(char),
    #[error("Source is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CsvResult<T> = std::result::Result<T, CsvError>;

struct CharName(char);

fn char_name(c: &char) -> CharName {
    CharName(*c)
}

impl fmt::Display for CharName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            '\n' => f.write_str("lf"),
            '\r' => f.write_str("cr"),
            c if c.is_control() => write!(f, "{}", c.escape_default()),
            c => write!(f, "{c}"),
        }
    }
}
