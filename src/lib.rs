//! Single-pass CSV parsing into keyed records.
//!
//! - One call parses one complete in-memory source, start to end.
//! - Records are keyed by header name, or by column index when headers are off.
//! - Strict mode requires CRLF line endings; lenient mode also takes LF.
//! - The first malformed construct fails the whole call with its exact
//!   line, column and character index.
//!
//! ```
//! use csv_records::{CsvParser, ParserOptions};
//!
//! let parser = CsvParser::new(ParserOptions::new().delimiter(';'))?;
//! let records = parser.parse("name;id\nFoo;\"1\"\"2\"")?;
//! assert_eq!(records[0].name("id"), Some("1\"2"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Loading sources (gzip/zstd, legacy charsets) lives in [`build_source_reader`]
//! and friends; the parser itself never touches I/O.
#![cfg_attr(docsrs, feature(doc_cfg))]
//
mod classify;
mod codec;
mod cursor;
mod error;
mod field;
mod io;
mod parser;
mod record;

pub use crate::classify::Encoding;
pub use crate::error::{CsvError, CsvResult, ErrorKind, ParseError, Position};
pub use crate::io::{build_source_reader, read_source, source_from_path, SourceMeta};
pub use crate::parser::{CsvParser, ListenerId, ParserOptions};
pub use crate::record::{Key, Record};
