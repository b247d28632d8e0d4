use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type HashResult<T> = Result<T, HashError>;

/// Every way a hash computation can fail. The core returns these as-is;
/// deciding what to print or how to exit is left to the caller.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("couldn't open {} for hashing: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't stat {} for hashing: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading {location} at offset {offset}: {source}")]
    Read {
        location: String,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{url} doesn't support range fetch")]
    RangeUnsupported { url: String },

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error("file is too small to generate a valid hash ({size} bytes, need at least {minimum})")]
    SourceTooSmall { size: u64, minimum: u64 },

    #[error("span at offset {offset} of {size} bytes doesn't fit a source of {total} bytes")]
    InvalidSpan { offset: i64, size: u64, total: u64 },

    #[error("short read from {location} at offset {offset}: wanted {expected} bytes, got {actual}")]
    ShortRead {
        location: String,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("buffer of {len} bytes is not a whole number of 64-bit words")]
    Decode { len: usize },
}

impl HashError {
    /// Stable identifier for machine-readable reports.
    pub fn kind(&self) -> &'static str {
        match self {
            HashError::Open { .. } => "open",
            HashError::Stat { .. } => "stat",
            HashError::Read { .. } => "read",
            HashError::Network { .. } => "network",
            HashError::Timeout { .. } => "timeout",
            HashError::HttpStatus { .. } => "http_status",
            HashError::RangeUnsupported { .. } => "range_unsupported",
            HashError::MalformedResponse { .. } => "malformed_response",
            HashError::SourceTooSmall { .. } => "source_too_small",
            HashError::InvalidSpan { .. } => "invalid_span",
            HashError::ShortRead { .. } => "short_read",
            HashError::Decode { .. } => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_small_message_names_both_sizes() {
        let err = HashError::SourceTooSmall {
            size: 131071,
            minimum: 131072,
        };
        assert_eq!(err.kind(), "source_too_small");
        let msg = err.to_string();
        assert!(msg.contains("131071"));
        assert!(msg.contains("131072"));
    }

    #[test]
    fn open_error_keeps_io_source() {
        use std::error::Error as _;
        let err = HashError::Open {
            path: PathBuf::from("/nope/movie.mkv"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.kind(), "open");
        assert!(err.to_string().contains("/nope/movie.mkv"));
        assert!(err.source().is_some());
    }
}
