//! Field scanning.
//!
//! Both scanners start at the cursor and leave it on the first character after
//! the field: the delimiter or line terminator that bounds an unescaped field,
//! or the character after the closing quote of an escaped one.

use crate::classify::{Class, Classifier, CRLF, LF, QUOTE};
use crate::cursor::Cursor;
use crate::error::{ErrorKind, ParseError};

/// Scans an unescaped field. The bounding delimiter, CR or LF is left
/// unconsumed.
pub(crate) fn scan_unescaped(
    cursor: &mut Cursor<'_>,
    classifier: &Classifier,
) -> Result<String, ParseError> {
    let mut value = String::new();

    while let Some(c) = cursor.peek() {
        match classifier.classify(c) {
            Class::Delimiter | Class::CarriageReturn | Class::LineFeed => break,
            Class::Comma | Class::TextData => cursor.consume_into(1, &mut value),
            Class::Quote | Class::Illegal => {
                return Err(cursor.error(ErrorKind::UnexpectedCharacter(c)))
            }
        }
    }

    Ok(value)
}

/// Scans a quoted field starting at its opening quote and returns the decoded
/// content. Doubled quotes collapse to one; CR, LF and delimiters are content.
pub(crate) fn scan_escaped(
    cursor: &mut Cursor<'_>,
    classifier: &Classifier,
) -> Result<String, ParseError> {
    let mut value = String::new();

    cursor.advance(1);

    while let Some(c) = cursor.peek() {
        match classifier.classify(c) {
            Class::Quote => {
                if closes_field(cursor, classifier) {
                    break;
                }
                if cursor.peek_at(1) != Some(QUOTE) {
                    return Err(cursor.error(ErrorKind::UnescapedQuote));
                }
                cursor.consume_into(1, &mut value);
                cursor.advance(1);
            }
            Class::LineFeed => cursor.consume_line_feed(&mut value),
            Class::CarriageReturn | Class::Delimiter | Class::Comma | Class::TextData => {
                cursor.consume_into(1, &mut value)
            }
            Class::Illegal => return Err(cursor.error(ErrorKind::UnexpectedCharacter(c))),
        }
    }

    if cursor.peek() != Some(QUOTE) {
        return Err(cursor.error(ErrorKind::UnterminatedField));
    }
    cursor.advance(1);

    Ok(value)
}

/// A quote at the cursor closes the field when followed by end of input, the
/// delimiter, LF or CRLF.
fn closes_field(cursor: &Cursor<'_>, classifier: &Classifier) -> bool {
    match cursor.peek_at(1) {
        None => true,
        Some(next) => {
            next == classifier.delimiter() || next == LF || cursor.expect(1, &CRLF)
        }
    }
}
