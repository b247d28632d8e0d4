use std::io;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, RANGE,
};
use reqwest::StatusCode;

use super::{read_full, ChunkSource, ReaderOptions};
use crate::error::{HashError, HashResult};

/// An HTTP(S) resource read through `Range` requests.
///
/// All requests made through one `RemoteSource` share a single deadline that
/// starts when it is created.
pub struct RemoteSource {
    url: String,
    client: Client,
    timeout: Duration,
    deadline: Instant,
    /// Size from the HEAD probe, used to check `Content-Range` on each GET.
    size: Option<u64>,
}

impl RemoteSource {
    pub fn new(url: &str, options: &ReaderOptions) -> HashResult<Self> {
        let mut builder = Client::builder().connect_timeout(options.timeout);
        if let Some(agent) = &options.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build().map_err(|source| HashError::Network {
            url: url.to_string(),
            source,
        })?;
        Ok(Self {
            url: url.to_string(),
            client,
            timeout: options.timeout,
            deadline: Instant::now() + options.timeout,
            size: None,
        })
    }

    fn timed_out(&self) -> HashError {
        HashError::Timeout {
            url: self.url.clone(),
            after: self.timeout,
        }
    }

    fn send(&self, request: RequestBuilder) -> HashResult<Response> {
        let left = self.deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(self.timed_out());
        }
        request.timeout(left).send().map_err(|source| {
            if source.is_timeout() {
                self.timed_out()
            } else {
                HashError::Network {
                    url: self.url.clone(),
                    source,
                }
            }
        })
    }

    fn malformed(&self, reason: String) -> HashError {
        HashError::MalformedResponse {
            url: self.url.clone(),
            reason,
        }
    }

    /// Classify a failure while reading a response body. The blocking
    /// client hands transport errors back as an `io::Error` wrapping a
    /// `reqwest::Error`.
    fn body_error(&self, offset: u64, source: io::Error) -> HashError {
        if source.kind() == io::ErrorKind::TimedOut {
            return self.timed_out();
        }
        if source.get_ref().is_none() {
            return self.read_error(offset, source);
        }
        let kind = source.kind();
        match source.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
            Some(Ok(err)) if err.is_timeout() => self.timed_out(),
            Some(Ok(err)) => HashError::Network {
                url: self.url.clone(),
                source: *err,
            },
            Some(Err(inner)) => self.read_error(offset, io::Error::new(kind, inner)),
            None => self.read_error(offset, io::Error::from(kind)),
        }
    }

    fn read_error(&self, offset: u64, source: io::Error) -> HashError {
        HashError::Read {
            location: self.url.clone(),
            offset,
            source,
        }
    }
}

impl ChunkSource for RemoteSource {
    fn total_size(&mut self) -> HashResult<u64> {
        let resp = self.send(self.client.head(&self.url))?;
        if !resp.status().is_success() {
            return Err(HashError::HttpStatus {
                url: self.url.clone(),
                status: resp.status(),
            });
        }
        if !accepts_byte_ranges(resp.headers()) {
            return Err(HashError::RangeUnsupported {
                url: self.url.clone(),
            });
        }
        let size = content_length(resp.headers()).map_err(|reason| self.malformed(reason))?;
        self.size = Some(size);
        Ok(size)
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> HashResult<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let last = offset + buf.len() as u64 - 1;
        let request = self
            .client
            .get(&self.url)
            .header(RANGE, format!("bytes={offset}-{last}"));
        let mut resp = self.send(request)?;

        match resp.status() {
            StatusCode::PARTIAL_CONTENT => {}
            // Full body instead of the range: the server ignored `Range`.
            StatusCode::OK => {
                return Err(HashError::RangeUnsupported {
                    url: self.url.clone(),
                })
            }
            status => {
                return Err(HashError::HttpStatus {
                    url: self.url.clone(),
                    status,
                })
            }
        }

        if let Some(value) = resp.headers().get(CONTENT_RANGE) {
            check_content_range(value, offset, last, self.size)
                .map_err(|reason| self.malformed(reason))?;
        }

        let n = read_full(&mut resp, buf).map_err(|e| self.body_error(offset, e))?;
        if n != buf.len() {
            return Err(HashError::ShortRead {
                location: self.url.clone(),
                offset,
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }
}

fn accepts_byte_ranges(headers: &HeaderMap) -> bool {
    headers.get_all(ACCEPT_RANGES).iter().any(|value| {
        value
            .to_str()
            .map(|s| s.split(',').any(|unit| unit.trim().eq_ignore_ascii_case("bytes")))
            .unwrap_or(false)
    })
}

fn content_length(headers: &HeaderMap) -> Result<u64, String> {
    let value = headers
        .get(CONTENT_LENGTH)
        .ok_or_else(|| "missing Content-Length header".to_string())?;
    let text = value
        .to_str()
        .map_err(|_| "Content-Length is not valid ASCII".to_string())?;
    text.trim()
        .parse()
        .map_err(|_| format!("invalid Content-Length {text:?}"))
}

/// Check a `Content-Range: bytes first-last/complete` header against the
/// range that was asked for and the size seen by the HEAD probe.
fn check_content_range(
    value: &HeaderValue,
    first: u64,
    last: u64,
    size: Option<u64>,
) -> Result<(), String> {
    let text = value
        .to_str()
        .map_err(|_| "Content-Range is not valid ASCII".to_string())?;
    let unexpected = || format!("unexpected Content-Range {text:?}");

    let spec = text.strip_prefix("bytes ").ok_or_else(unexpected)?;
    let (range, complete) = spec.split_once('/').ok_or_else(unexpected)?;
    let (got_first, got_last) = range.split_once('-').ok_or_else(unexpected)?;
    let got_first: u64 = got_first.trim().parse().map_err(|_| unexpected())?;
    let got_last: u64 = got_last.trim().parse().map_err(|_| unexpected())?;

    if (got_first, got_last) != (first, last) {
        return Err(format!(
            "Content-Range {text:?} doesn't match requested bytes {first}-{last}"
        ));
    }
    // "*" means the server doesn't know the complete length.
    if let (Some(size), Ok(complete)) = (size, complete.trim().parse::<u64>()) {
        if complete != size {
            return Err(format!("size changed from {size} to {complete} between requests"));
        }
    }
    Ok(())
}
