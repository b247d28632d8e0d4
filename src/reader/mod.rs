//! Chunked reads over local files and HTTP(S) range requests.
//!
//! A caller names a source and the spans it wants; the reader works out the
//! total size, checks it against a minimum, resolves end-relative offsets and
//! returns the spans concatenated in request order.

mod local;
mod remote;

pub use local::LocalSource;
pub use remote::RemoteSource;

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{HashError, HashResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A byte range to fetch. A negative offset counts back from the end of the
/// source and is resolved once the total size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: i64,
    pub size: u64,
}

impl Span {
    pub const fn new(offset: i64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Absolute start offset within a source of `total` bytes.
    pub fn resolve(&self, total: u64) -> HashResult<u64> {
        let invalid = || HashError::InvalidSpan {
            offset: self.offset,
            size: self.size,
            total,
        };
        let start = if self.offset < 0 {
            total.checked_sub(self.offset.unsigned_abs()).ok_or_else(invalid)?
        } else {
            self.offset as u64
        };
        match start.checked_add(self.size) {
            Some(end) if end <= total => Ok(start),
            _ => Err(invalid()),
        }
    }
}

/// Where the bytes come from, classified by prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Remote(String),
}

impl Source {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            Source::Remote(source.to_string())
        } else {
            Source::Local(PathBuf::from(source))
        }
    }
}

/// Settings for the remote backend.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// One deadline shared by every request made for a single fetch.
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }
}

/// Result of a fetch: the source size and every span's bytes, back to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedChunks {
    pub total_size: u64,
    pub buffer: Vec<u8>,
}

/// A backend able to report its size and fill a buffer from an absolute offset.
pub trait ChunkSource {
    fn total_size(&mut self) -> HashResult<u64>;

    /// Fill all of `buf` from `offset`, or fail with [`HashError::ShortRead`].
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> HashResult<()>;
}

/// Open the backend matching `source`.
pub fn open(source: &Source, options: &ReaderOptions) -> HashResult<Box<dyn ChunkSource>> {
    Ok(match source {
        Source::Local(path) => Box::new(LocalSource::open(path)?),
        Source::Remote(url) => Box::new(RemoteSource::new(url, options)?),
    })
}

/// Classify `source`, open its backend and read `spans` from it.
pub fn fetch_spans(
    source: &str,
    minimum_size: u64,
    spans: &[Span],
    options: &ReaderOptions,
) -> HashResult<FetchedChunks> {
    let mut backend = open(&Source::parse(source), options)?;
    read_spans(backend.as_mut(), minimum_size, spans)
}

/// Backend-agnostic part of a fetch: size check, span resolution, and
/// sequential reads into one buffer.
pub fn read_spans<S>(source: &mut S, minimum_size: u64, spans: &[Span]) -> HashResult<FetchedChunks>
where
    S: ChunkSource + ?Sized,
{
    let total_size = source.total_size()?;
    if total_size < minimum_size {
        return Err(HashError::SourceTooSmall {
            size: total_size,
            minimum: minimum_size,
        });
    }

    // Resolve everything up front so a bad span fails before any read.
    let mut resolved = Vec::with_capacity(spans.len());
    let mut buffer_len: usize = 0;
    for span in spans {
        let start = span.resolve(total_size)?;
        let len = usize::try_from(span.size).map_err(|_| HashError::InvalidSpan {
            offset: span.offset,
            size: span.size,
            total: total_size,
        })?;
        buffer_len = buffer_len
            .checked_add(len)
            .ok_or(HashError::InvalidSpan {
                offset: span.offset,
                size: span.size,
                total: total_size,
            })?;
        resolved.push((start, len));
    }

    let mut buffer = vec![0u8; buffer_len];
    let mut filled = 0;
    for (start, len) in resolved {
        source.read_exact_at(start, &mut buffer[filled..filled + len])?;
        filled += len;
    }

    Ok(FetchedChunks { total_size, buffer })
}

/// Read until `buf` is full or the reader hits end of stream; returns how
/// many bytes landed.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
