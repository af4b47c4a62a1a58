use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{ErrorKind, ParseError, Position};

/// Column key: the header name in header mode, the zero-based column index
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Name(Arc<str>),
    Index(usize),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(Arc::from(name))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// One parsed row. Entries keep column order; keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<(Key, String)>,
}

impl Record {
    /// Builds a record from key/value pairs, mostly for writing expected
    /// records in tests. Later duplicates overwrite earlier ones.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<Key>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Record::default();
        for (k, v) in pairs {
            record.insert(k.into(), v.into());
        }
        record
    }

    pub fn get(&self, key: &Key) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Lookup by header name.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|(k, v)| match k {
            Key::Name(n) if &**n == name => Some(v.as_str()),
            _ => None,
        })
    }

    /// Lookup by column index (headerless records).
    pub fn index(&self, index: usize) -> Option<&str> {
        self.get(&Key::Index(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, v)| v.as_str())
    }

    /// Appends without looking for an existing key. The caller guarantees
    /// the key is new.
    fn push(&mut self, key: Key, value: String) {
        self.entries.push((key, value));
    }

    fn insert(&mut self, key: Key, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// How column keys are produced, fixed once per parse from configuration.
#[derive(Debug)]
enum Keys {
    /// `repeats` is set when the header row closes and some name occurs
    /// twice; only then can a data row hit an existing key.
    Header { names: Vec<Arc<str>>, repeats: bool },
    Positional,
}

/// A record that has passed its field-count check, ready to be announced.
pub(crate) enum Closed<'a> {
    Header(&'a [Arc<str>]),
    Data(&'a Record),
}

/// Accumulates fields into records and enforces the header width.
pub(crate) struct RecordBuilder {
    keys: Keys,
    records: Vec<Record>,
    /// Column of the next field within the current record.
    column: usize,
    header_closed: bool,
}

impl RecordBuilder {
    pub fn new(headers: bool) -> Self {
        Self {
            keys: if headers {
                Keys::Header {
                    names: Vec::new(),
                    repeats: false,
                }
            } else {
                Keys::Positional
            },
            records: Vec::new(),
            column: 0,
            header_closed: false,
        }
    }

    /// Routes a scanned field to the header row (record 0 in header mode) or
    /// the open data record.
    pub fn add(&mut self, record: usize, field: String, at: Position) -> Result<(), ParseError> {
        match &mut self.keys {
            Keys::Header { names, .. } if record == 0 => names.push(Arc::from(field)),
            Keys::Header { names, repeats } => {
                let width = names.len();
                let key = names.get(self.column).cloned();
                let open = open_record(&mut self.records);
                let entries = open.len();
                match key {
                    Some(name) if entries < width && *repeats => {
                        open.insert(Key::Name(name), field)
                    }
                    Some(name) if entries < width => open.push(Key::Name(name), field),
                    _ => return Err(ParseError::new(ErrorKind::FieldCount(entries), at)),
                }
            }
            // Column indices only grow within a record.
            Keys::Positional => {
                open_record(&mut self.records).push(Key::Index(self.column), field)
            }
        }
        self.column += 1;
        Ok(())
    }

    /// Called at a record-closing line terminator that has more input after
    /// it. Validates and returns the record just finished, then opens the
    /// next one.
    pub fn close(&mut self, at: Position) -> Result<Closed<'_>, ParseError> {
        self.column = 0;

        if !self.header_closed {
            if let Keys::Header { names, repeats } = &mut self.keys {
                let mut seen = HashSet::with_capacity(names.len());
                *repeats = !names.iter().all(|n| seen.insert(n));
            }
        }

        if let Keys::Header { names, .. } = &self.keys {
            if !self.header_closed {
                self.header_closed = true;
                self.records.push(Record::default());
                return Ok(Closed::Header(names));
            }
        }

        // A blank line still closes a (possibly empty) record.
        open_record(&mut self.records);
        let last = self.records.len() - 1;
        self.validate(&self.records[last], at)?;
        self.records.push(Record::default());
        Ok(Closed::Data(&self.records[last]))
    }

    /// Validates whatever is still open at end of input.
    pub fn finish(&mut self, at: Position) -> Result<Option<Closed<'_>>, ParseError> {
        if let Keys::Header { names, .. } = &self.keys {
            if !self.header_closed {
                self.header_closed = true;
                return Ok((!names.is_empty()).then_some(Closed::Header(names)));
            }
        }

        match self.records.last() {
            Some(last) => {
                self.validate(last, at)?;
                Ok(Some(Closed::Data(last)))
            }
            None => Ok(None),
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn validate(&self, record: &Record, at: Position) -> Result<(), ParseError> {
        match &self.keys {
            Keys::Header { names, .. } if record.len() != names.len() => {
                Err(ParseError::new(ErrorKind::FieldCount(record.len()), at))
            }
            _ => Ok(()),
        }
    }
}

fn open_record(records: &mut Vec<Record>) -> &mut Record {
    if records.is_empty() {
        records.push(Record::default());
    }
    let last = records.len() - 1;
    &mut records[last]
}
