//! OSDB hash: the 64 KiB head and tail of a file, summed as u64 words,
//! plus the file size.

use std::path::Path;

use serde::Serialize;

use crate::error::HashResult;
use crate::hash;
use crate::reader::{self, FetchedChunks, LocalSource, ReaderOptions, Span};

pub const CHUNK_SIZE: u64 = 64 * 1024;

/// Head and tail must not overlap.
pub const MINIMUM_SIZE: u64 = 2 * CHUNK_SIZE;

const SPANS: [Span; 2] = [
    Span::new(0, CHUNK_SIZE),
    Span::new(-(CHUNK_SIZE as i64), CHUNK_SIZE),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsdbHash {
    pub hash: String,
    pub size: u64,
}

/// Hash a local path or an `http(s)://` URL.
pub fn hash_source(source: &str, options: &ReaderOptions) -> HashResult<OsdbHash> {
    fold(reader::fetch_spans(source, MINIMUM_SIZE, &SPANS, options)?)
}

/// Hash a local file, whatever its path looks like.
pub fn hash_local(path: &Path) -> HashResult<OsdbHash> {
    let mut source = LocalSource::open(path)?;
    fold(reader::read_spans(&mut source, MINIMUM_SIZE, &SPANS)?)
}

fn fold(fetched: FetchedChunks) -> HashResult<OsdbHash> {
    let hash = hash::compute_identity_hash(&fetched.buffer, fetched.total_size)?;
    Ok(OsdbHash {
        hash,
        size: fetched.total_size,
    })
}
