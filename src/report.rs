use anyhow::Result;
use serde::Serialize;
use std::io::{Stderr, Stdout, Write};

use crate::error::HashResult;
use crate::osdb::OsdbHash;

#[derive(Serialize)]
struct HashRecord<'a> {
    source: &'a str,
    hash: &'a str,
    size: u64,
}

#[derive(Serialize)]
struct ErrorRecord<'a> {
    error: bool,
    kind: &'a str,
    message: String,
    source: &'a str,
}

/// Writes one line per hashed source and counts outcomes.
///
/// Text mode: `<hash>  <source>` on `out`, failures on `err`.
/// JSON mode: one object per line on `out` for both.
pub struct Reporter<O: Write, E: Write> {
    json: bool,
    out: O,
    err: E,
    hashed: usize,
    failed: usize,
}

impl Reporter<Stdout, Stderr> {
    pub fn stdio(json: bool) -> Self {
        Self::new(json, std::io::stdout(), std::io::stderr())
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(json: bool, out: O, err: E) -> Self {
        Self {
            json,
            out,
            err,
            hashed: 0,
            failed: 0,
        }
    }

    pub fn record(&mut self, source: &str, result: &HashResult<OsdbHash>) -> Result<()> {
        match result {
            Ok(osdb) => {
                self.hashed += 1;
                if self.json {
                    let record = HashRecord {
                        source,
                        hash: &osdb.hash,
                        size: osdb.size,
                    };
                    serde_json::to_writer(&mut self.out, &record)?;
                    writeln!(self.out)?;
                } else {
                    writeln!(self.out, "{}  {}", osdb.hash, source)?;
                }
            }
            Err(e) => {
                self.failed += 1;
                if self.json {
                    let record = ErrorRecord {
                        error: true,
                        kind: e.kind(),
                        message: e.to_string(),
                        source,
                    };
                    serde_json::to_writer(&mut self.out, &record)?;
                    writeln!(self.out)?;
                } else {
                    writeln!(self.err, "{}: {}", source, e)?;
                }
            }
        }
        Ok(())
    }

    pub fn hashed(&self) -> usize {
        self.hashed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Write a free-form note to the error stream.
    pub fn note(&mut self, msg: &str) -> Result<()> {
        writeln!(self.err, "{}", msg)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        self.err.flush()?;
        Ok(())
    }
}
