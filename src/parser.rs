use std::sync::Arc;

use tracing::{debug, trace};

use crate::classify::{Class, Classifier, Encoding, CR, LF, QUOTE};
use crate::cursor::Cursor;
use crate::error::{CsvError, CsvResult, ErrorKind, ParseError};
use crate::field::{scan_escaped, scan_unescaped};
use crate::record::{Closed, Record, RecordBuilder};

/// Parser configuration. Defaults: `,` delimiter, header row on, lenient line
/// endings, UTF-8 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub delimiter: char,
    /// Treat the first record as the header row.
    pub headers: bool,
    /// Require CRLF line endings.
    pub strict: bool,
    pub encoding: Encoding,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            headers: true,
            strict: false,
            encoding: Encoding::Utf8,
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn headers(mut self, yes: bool) -> Self {
        self.headers = yes;
        self
    }

    pub fn strict(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Handle returned by listener registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type RecordListener = Box<dyn Fn(&Record) + Send + Sync>;
type HeaderListener = Box<dyn Fn(&[Arc<str>]) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    record: Vec<(ListenerId, RecordListener)>,
    header: Vec<(ListenerId, HeaderListener)>,
}

impl Listeners {
    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn emit(&self, closed: Closed<'_>) {
        match closed {
            Closed::Header(names) => {
                for (_, listener) in &self.header {
                    listener(names);
                }
            }
            Closed::Data(record) => {
                trace!(fields = record.len(), "record produced");
                for (_, listener) in &self.record {
                    listener(record);
                }
            }
        }
    }
}

/// Single-pass CSV parser.
///
/// Only configuration and listeners live on the parser; every `parse` call
/// builds its own scan state, so one parser can serve several threads.
#[derive(Default)]
pub struct CsvParser {
    options: ParserOptions,
    listeners: Listeners,
}

impl std::fmt::Debug for CsvParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvParser")
            .field("options", &self.options)
            .field("record_listeners", &self.listeners.record.len())
            .field("header_listeners", &self.listeners.header.len())
            .finish()
    }
}

impl CsvParser {
    /// Fails with [`CsvError::InvalidDelimiter`] when the delimiter is a
    /// quote or a line terminator.
    pub fn new(options: ParserOptions) -> CsvResult<Self> {
        if matches!(options.delimiter, QUOTE | CR | LF) {
            return Err(CsvError::InvalidDelimiter(options.delimiter));
        }
        Ok(Self {
            options,
            listeners: Listeners::default(),
        })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Registers a callback run for every data record, in source order, as
    /// soon as the record has been validated. Header rows are not reported.
    pub fn on_record<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&Record) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id();
        self.listeners.record.push((id, Box::new(listener)));
        id
    }

    /// Registers a callback run once per parse with the header names, when
    /// header mode is on and the header row is complete.
    pub fn on_header<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&[Arc<str>]) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id();
        self.listeners.header.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener of either kind. Returns false for unknown ids.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.record.len() + self.listeners.header.len();
        self.listeners.record.retain(|(i, _)| *i != id);
        self.listeners.header.retain(|(i, _)| *i != id);
        before != self.listeners.record.len() + self.listeners.header.len()
    }

    /// Parses a complete source. Returns the data records in source order, or
    /// the first syntax error.
    pub fn parse(&self, source: &str) -> Result<Vec<Record>, ParseError> {
        let chars: Vec<char> = source.chars().collect();
        let mut scan = Scan::new(&chars, &self.options);

        scan.run(&self.listeners)?;

        let end = scan.cursor.position();
        let records = scan.builder.into_records();
        debug!(
            records = records.len(),
            lines = end.line + 1,
            chars = end.index,
            "parsed csv source"
        );
        Ok(records)
    }
}

/// Mutable state of one parse call.
struct Scan<'a> {
    cursor: Cursor<'a>,
    classifier: Classifier,
    builder: RecordBuilder,
    strict: bool,
}

impl<'a> Scan<'a> {
    fn new(chars: &'a [char], options: &ParserOptions) -> Self {
        Self {
            cursor: Cursor::new(chars),
            classifier: Classifier::new(options.delimiter, options.encoding),
            builder: RecordBuilder::new(options.headers),
            strict: options.strict,
        }
    }

    fn run(&mut self, listeners: &Listeners) -> Result<(), ParseError> {
        while let Some(c) = self.cursor.peek() {
            match self.classifier.classify(c) {
                Class::CarriageReturn => {
                    if self.cursor.peek_at(1) != Some(LF) {
                        return Err(self.cursor.error(ErrorKind::ExpectedLineFeed));
                    }
                    self.cursor.advance(1);
                    self.end_of_line(listeners)?;
                }
                Class::LineFeed => {
                    if self.strict {
                        return Err(self.cursor.error(ErrorKind::UnexpectedCharacter(LF)));
                    }
                    self.end_of_line(listeners)?;
                }
                Class::Delimiter => self.delimiter()?,
                Class::Quote => {
                    let field = scan_escaped(&mut self.cursor, &self.classifier)?;
                    self.add(field)?;
                }
                Class::Comma | Class::TextData | Class::Illegal => {
                    let field = scan_unescaped(&mut self.cursor, &self.classifier)?;
                    self.add(field)?;
                }
            }
        }

        let at = self.cursor.position();
        if let Some(closed) = self.builder.finish(at)? {
            listeners.emit(closed);
        }
        Ok(())
    }

    /// Consumes the LF that ends a record. A terminator at end of input does
    /// not open a new record; the open one is settled by `finish`.
    fn end_of_line(&mut self, listeners: &Listeners) -> Result<(), ParseError> {
        self.cursor.consume_newline();
        if !self.cursor.at_end() {
            let closed = self.builder.close(self.cursor.position())?;
            listeners.emit(closed);
        }
        Ok(())
    }

    /// Handles a delimiter at the cursor, recording the empty fields it
    /// bounds: one before it at the start of a line, one after it when
    /// another delimiter, a line terminator or end of input follows.
    fn delimiter(&mut self) -> Result<(), ParseError> {
        if self.cursor.position().column == 0 {
            self.add(String::new())?;
        }

        self.cursor.advance(1);

        match self.cursor.peek() {
            Some(LF) if self.strict => {
                Err(self.cursor.error(ErrorKind::UnexpectedCharacter(LF)))
            }
            None => self.add(String::new()),
            Some(next) if next == self.classifier.delimiter() || next == CR || next == LF => {
                self.add(String::new())
            }
            Some(_) => Ok(()),
        }
    }

    fn add(&mut self, field: String) -> Result<(), ParseError> {
        let record = self.cursor.record();
        self.builder.add(record, field, self.cursor.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn headerless() -> CsvParser {
        CsvParser::new(ParserOptions::new().headers(false)).unwrap()
    }

    fn row(values: &[&str]) -> Record {
        Record::from_pairs(values.iter().copied().enumerate())
    }

    #[test]
    fn empty_fields_around_delimiters() {
        let records = headerless().parse(",a,,b,").unwrap();
        assert_eq!(records, vec![row(&["", "a", "", "b", ""])]);
    }

    #[test]
    fn lone_delimiter_is_two_empty_fields() {
        let records = headerless().parse(",").unwrap();
        assert_eq!(records, vec![row(&["", ""])]);
    }

    #[test]
    fn blank_lines_are_empty_records_without_headers() {
        let records = headerless().parse("a\n\nb\n").unwrap();
        assert_eq!(records, vec![row(&["a"]), Record::default(), row(&["b"])]);
    }

    #[test]
    fn empty_source_has_no_records() {
        assert!(headerless().parse("").unwrap().is_empty());
        assert!(CsvParser::default().parse("").unwrap().is_empty());
    }

    #[test]
    fn bare_carriage_return_wants_line_feed() {
        let err = headerless().parse("a\rb").unwrap_err();
        assert_eq!(err.to_string(), "Expected \"lf\" at line: 0 column: 1 index: 1");
    }

    #[test]
    fn strict_rejects_line_feed_after_delimiter() {
        let parser = CsvParser::new(ParserOptions::new().strict(true)).unwrap();
        let err = parser.parse("a,\nb").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedCharacter('\n'));
        assert_eq!(err.position.index, 2);
    }

    #[test]
    fn rejects_structural_delimiters() {
        for d in ['"', '\r', '\n'] {
            let err = CsvParser::new(ParserOptions::new().delimiter(d)).unwrap_err();
            assert!(matches!(err, CsvError::InvalidDelimiter(c) if c == d));
        }
    }

    #[test]
    fn listeners_can_be_removed() {
        let seen = Arc::new(Mutex::new(0usize));
        let mut parser = headerless();
        let counter = Arc::clone(&seen);
        let id = parser.on_record(move |_| *counter.lock().unwrap() += 1);

        parser.parse("a\nb").unwrap();
        assert_eq!(*seen.lock().unwrap(), 2);

        assert!(parser.off(id));
        assert!(!parser.off(id));
        parser.parse("a\nb").unwrap();
        assert_eq!(*seen.lock().unwrap(), 2);
    }

    #[test]
    fn header_listener_fires_once() {
        let names = Arc::new(Mutex::new(Vec::<String>::new()));
        let mut parser = CsvParser::default();
        let sink = Arc::clone(&names);
        parser.on_header(move |h| {
            sink.lock()
                .unwrap()
                .extend(h.iter().map(|n| n.to_string()))
        });

        parser.parse("x,y\n1,2\n3,4").unwrap();
        assert_eq!(*names.lock().unwrap(), ["x", "y"]);
    }
}
