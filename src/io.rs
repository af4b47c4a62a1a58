use async_compression::tokio::bufread::{GzipDecoder, ZstdDecoder};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::codec::Utf8Transcoder;
use crate::{CsvParser, CsvResult, Record};

#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// e.g. "application/gzip" or "text/csv"
    pub content_type: String,
    /// e.g. "gzip", "zstd", "gzip, identity" or empty
    pub content_encoding: String,
    /// File name, used for the extension fallback.
    pub name_hint: String,
    /// Character set of the decompressed bytes (defaults to UTF-8).
    pub charset: &'static encoding_rs::Encoding,
}

impl Default for SourceMeta {
    fn default() -> Self {
        Self {
            content_type: String::new(),
            content_encoding: String::new(),
            name_hint: String::new(),
            charset: encoding_rs::UTF_8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    Gzip,
    Zstd,
    None,
}

impl SourceMeta {
    /// Gzip is tested before zstd; either may be named by content-encoding,
    /// content-type or file extension.
    fn compression(&self) -> Compression {
        let ce = self.content_encoding.to_ascii_lowercase();
        let ct = self.content_type.to_ascii_lowercase();
        let encoded = |name: &str| ce.split(',').any(|s| s.trim() == name);

        if encoded("gzip")
            || matches!(ct.as_str(), "application/gzip" | "application/x-gzip")
            || self.name_hint.ends_with(".gz")
        {
            Compression::Gzip
        } else if encoded("zstd") || ct == "application/zstd" || self.name_hint.ends_with(".zst") {
            Compression::Zstd
        } else {
            Compression::None
        }
    }

    /// Meta guessed from a file name alone.
    pub fn from_name(name: &str) -> Self {
        let mut meta = SourceMeta {
            name_hint: name.to_string(),
            ..Default::default()
        };
        let ext = Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        match ext {
            "gz" => {
                meta.content_type = "application/gzip".into();
                meta.content_encoding = "gzip".into();
            }
            "zst" => {
                meta.content_type = "application/zstd".into();
                meta.content_encoding = "zstd".into();
            }
            _ => meta.content_type = "text/csv".into(),
        }
        meta
    }
}

/// Wraps a raw reader with decompression and transcoding so that what comes
/// out is UTF-8 CSV text.
pub fn build_source_reader<R>(raw: R, meta: &SourceMeta) -> impl AsyncRead + Unpin + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let compression = meta.compression();
    debug!(?compression, charset = meta.charset.name(), name = %meta.name_hint, "opening csv source");

    let buf = BufReader::with_capacity(1 << 20, raw);
    let decompressed: Box<dyn AsyncRead + Unpin + Send> = match compression {
        Compression::Gzip => Box::new(GzipDecoder::new(buf)),
        Compression::Zstd => Box::new(ZstdDecoder::new(buf)),
        Compression::None => Box::new(buf),
    };

    // Transcode only when the charset is not already UTF-8.
    let text: Box<dyn AsyncRead + Unpin + Send> = if meta.charset == encoding_rs::UTF_8 {
        decompressed
    } else {
        let framed = FramedRead::new(decompressed, Utf8Transcoder::new(meta.charset));
        Box::new(StreamReader::new(framed))
    };
    text
}

/// Drains a reader into a `String`. The parser needs the whole source in
/// memory before it starts.
pub async fn read_source<R>(mut reader: R) -> CsvResult<String>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).await?;
    let text = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
    debug!(bytes = text.len(), "read csv source");
    Ok(text)
}

/// Opens a local file, decompressing by extension.
pub async fn source_from_path(path: &Path) -> CsvResult<(impl AsyncRead + Unpin + Send, SourceMeta)> {
    let file = File::open(path).await?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let meta = SourceMeta::from_name(name);
    Ok((build_source_reader(file, &meta), meta))
}

impl CsvParser {
    /// Loads a local file, decompressing by extension, and parses it.
    pub async fn parse_path(&self, path: &Path) -> CsvResult<Vec<Record>> {
        let (reader, _meta) = source_from_path(path).await?;
        let text = read_source(reader).await?;
        Ok(self.parse(&text)?)
    }

    /// Maps an uncompressed local UTF-8 file and parses it in place, skipping
    /// the async read path.
    #[cfg(feature = "fast_local")]
    #[cfg_attr(docsrs, doc(cfg(feature = "fast_local")))]
    pub fn parse_mapped(&self, path: &Path) -> CsvResult<Vec<Record>> {
        let file = std::fs::File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }
        // SAFETY: the map is read-only and dropped before returning.
        let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };
        let text = std::str::from_utf8(&mmap)?;
        Ok(self.parse(text)?)
    }
}
