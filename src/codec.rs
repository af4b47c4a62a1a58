use bytes::{Buf, BytesMut};
use encoding_rs::{Decoder as CharsetDecoder, Encoding};
use std::io;
use tokio_util::codec::Decoder;

/// Frames a byte stream in a legacy charset into UTF-8 chunks.
pub struct Utf8Transcoder {
    decoder: CharsetDecoder,
    /// Set once the decoder has been told the stream ended.
    flushed: bool,
}

impl Utf8Transcoder {
    pub fn new(charset: &'static Encoding) -> Self {
        Self {
            decoder: charset.new_decoder(),
            flushed: false,
        }
    }

    /// Decodes as much of `src` as fits; malformed sequences become U+FFFD,
    /// which the ASCII classifier rejects downstream.
    fn transcode(&mut self, src: &mut BytesMut, last: bool) -> Option<BytesMut> {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len() * 3 + 4);
        let mut out = String::with_capacity(capacity);

        let (_result, read, _replaced) = self.decoder.decode_to_string(src, &mut out, last);
        src.advance(read);

        if last {
            src.clear();
        }
        (!out.is_empty()).then(|| BytesMut::from(out.as_bytes()))
    }
}

impl Decoder for Utf8Transcoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        Ok(self.transcode(src, false))
    }

    /// Always flushes once, even with nothing left in `src`: the decoder may
    /// still hold a partial sequence from the last `decode`.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.flushed {
            return Ok(None);
        }
        self.flushed = true;
        Ok(self.transcode(src, true))
    }
}
