use crate::error::{ErrorKind, ParseError, Position};

/// Forward-only view over the decoded source with line/column bookkeeping.
pub(crate) struct Cursor<'a> {
    chars: &'a [char],
    pos: Position,
    /// Incremented at every record-closing line terminator; record 0 is the
    /// header row when headers are enabled.
    record: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(chars: &'a [char]) -> Self {
        Self {
            chars,
            pos: Position::default(),
            record: 0,
        }
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos.index + offset).copied()
    }

    /// True when the text at `offset` from the cursor starts with `expected`.
    pub fn expect(&self, offset: usize, expected: &[char]) -> bool {
        let start = self.pos.index + offset;
        self.chars
            .get(start..start + expected.len())
            .is_some_and(|s| s == expected)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos.index >= self.chars.len()
    }

    /// Consumes up to `count` characters on the current line, appending them
    /// to `out`.
    pub fn consume_into(&mut self, count: usize, out: &mut String) {
        for _ in 0..count {
            match self.peek() {
                Some(c) => {
                    out.push(c);
                    self.pos.index += 1;
                    self.pos.column += 1;
                }
                None => break,
            }
        }
    }

    /// Skips up to `count` characters on the current line.
    pub fn advance(&mut self, count: usize) {
        let remaining = self.chars.len().saturating_sub(self.pos.index);
        let step = count.min(remaining);
        self.pos.index += step;
        self.pos.column += step;
    }

    /// Consumes a line feed that is part of an escaped field's content. The
    /// line moves on but the record does not.
    pub fn consume_line_feed(&mut self, out: &mut String) {
        self.consume_into(1, out);
        self.pos.line += 1;
        self.pos.column = 0;
    }

    /// Consumes the final character of a record terminator and opens the next
    /// record.
    pub fn consume_newline(&mut self) {
        self.advance(1);
        self.record += 1;
        self.pos.line += 1;
        self.pos.column = 0;
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn record(&self) -> usize {
        self.record
    }

    pub fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn advancing_moves_index_and_column() {
        let src = chars("ab;c");
        let mut cursor = Cursor::new(&src);
        let mut out = String::new();
        cursor.consume_into(2, &mut out);
        assert_eq!(out, "ab");
        assert_eq!(cursor.peek(), Some(';'));
        assert_eq!(
            cursor.position(),
            Position {
                index: 2,
                line: 0,
                column: 2
            }
        );
    }

    #[test]
    fn consuming_past_the_end_stops_at_the_end() {
        let src = chars("xy");
        let mut cursor = Cursor::new(&src);
        cursor.advance(5);
        assert!(cursor.at_end());
        assert_eq!(cursor.position().index, 2);
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn newline_resets_column_and_counts_records() {
        let src = chars("a\r\nb");
        let mut cursor = Cursor::new(&src);
        cursor.advance(2);
        cursor.consume_newline();
        assert_eq!(cursor.record(), 1);
        assert_eq!(
            cursor.position(),
            Position {
                index: 3,
                line: 1,
                column: 0
            }
        );
    }

    #[test]
    fn embedded_line_feed_keeps_the_record() {
        let src = chars("\nz");
        let mut cursor = Cursor::new(&src);
        let mut out = String::new();
        cursor.consume_line_feed(&mut out);
        assert_eq!(out, "\n");
        assert_eq!(cursor.record(), 0);
        assert_eq!(cursor.position().line, 1);
        assert_eq!(cursor.position().column, 0);
    }

    #[test]
    fn expect_matches_lookahead() {
        let src = chars("\"\r\n");
        let cursor = Cursor::new(&src);
        assert!(cursor.expect(1, &['\r', '\n']));
        assert!(!cursor.expect(2, &['\r', '\n']));
    }
}
