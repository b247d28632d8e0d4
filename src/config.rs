use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::reader::ReaderOptions;

const CONFIG_FILE: &str = "osdbhash_options.yaml";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deadline for all requests made for one URL.
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub json: bool,
    pub recursive: bool,
    pub follow_symlinks: bool,
    pub hidden: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Config {
    /// Load config from osdbhash_options.yaml, checking CWD first then exe dir.
    pub fn load() -> Result<Self> {
        for path in config_candidates() {
            if path.exists() {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                return Self::parse(&text).with_context(|| format!("parsing {}", path.display()));
            }
        }
        Ok(Config::default())
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reader settings, with a CLI timeout taking priority over the file.
    pub fn reader_options(&self, timeout_override: Option<u64>) -> Result<ReaderOptions> {
        let mut options = ReaderOptions::default();
        if let Some(secs) = timeout_override.or(self.timeout_secs) {
            ensure!(secs > 0, "timeout must be at least 1 second");
            options.timeout = Duration::from_secs(secs);
        }
        options.user_agent = self.user_agent.clone();
        Ok(options)
    }
}

fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(CONFIG_FILE));
        }
    }
    candidates
}
