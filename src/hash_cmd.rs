use anyhow::{bail, Result};
use std::time::Instant;

use crate::cli::HashArgs;
use crate::config::Config;
use crate::osdb;
use crate::report::Reporter;

pub fn run(args: &HashArgs, config: &Config) -> Result<()> {
    let options = config.reader_options(args.timeout)?;
    let mut reporter = Reporter::stdio(args.json || config.json);

    for source in &args.sources {
        tracing::debug!(source = %source, "hashing");
        let started = Instant::now();
        let result = osdb::hash_source(source, &options);
        match &result {
            Ok(osdb) => tracing::info!(
                source = %source,
                hash = %osdb.hash,
                size = osdb.size,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "hashed"
            ),
            Err(e) => tracing::warn!(source = %source, kind = e.kind(), error = %e, "hash failed"),
        }
        reporter.record(source, &result)?;
    }
    reporter.flush()?;

    if reporter.failed() > 0 {
        bail!(
            "{} of {} sources failed",
            reporter.failed(),
            args.sources.len()
        );
    }
    Ok(())
}
