pub(crate) const QUOTE: char = '"';
pub(crate) const LF: char = '\n';
pub(crate) const CR: char = '\r';
pub(crate) const COMMA: char = ',';
pub(crate) const CRLF: [char; 2] = [CR, LF];

/// Which characters may appear as field content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Anything but a quote, CR, LF or the delimiter.
    #[default]
    Utf8,
    /// Printable ASCII only. Catches sources decoded with the wrong charset.
    Ascii,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    Quote,
    LineFeed,
    CarriageReturn,
    Delimiter,
    Comma,
    TextData,
    Illegal,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Classifier {
    delimiter: char,
    encoding: Encoding,
}

impl Classifier {
    pub fn new(delimiter: char, encoding: Encoding) -> Self {
        Self {
            delimiter,
            encoding,
        }
    }

    #[inline]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn classify(&self, c: char) -> Class {
        match c {
            QUOTE => Class::Quote,
            LF => Class::LineFeed,
            CR => Class::CarriageReturn,
            c if c == self.delimiter => Class::Delimiter,
            // A literal comma is field content under any delimiter, even in
            // ASCII mode where it is outside the text range.
            COMMA => Class::Comma,
            c if self.is_text_data(c) => Class::TextData,
            _ => Class::Illegal,
        }
    }

    pub fn is_text_data(&self, c: char) -> bool {
        match self.encoding {
            Encoding::Ascii => matches!(c, '\x20'..='\x21' | '\x23'..='\x2B' | '\x2D'..='\x7E'),
            Encoding::Utf8 => !matches!(c, QUOTE | LF | CR) && c != self.delimiter,
        }
    }
}
