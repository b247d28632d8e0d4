use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::cli::ScanArgs;
use crate::config::Config;
use crate::error::HashError;
use crate::osdb;
use crate::report::Reporter;

pub struct ScanOptions {
    pub recursive: bool,
    pub follow_symlinks: bool,
    pub hidden: bool,
    pub include: GlobSet,
    pub exclude: GlobSet,
}

impl ScanOptions {
    pub fn from_args_and_config(args: &ScanArgs, config: &Config) -> Result<Self> {
        let recursive = args.recursive || config.recursive;
        let follow_symlinks = args.follow_symlinks || config.follow_symlinks;
        let hidden = args.hidden || config.hidden;

        // CLI include/exclude take priority; fall back to config
        let include_globs = if !args.include.is_empty() {
            &args.include
        } else {
            &config.include
        };
        let exclude_globs = if !args.exclude.is_empty() {
            &args.exclude
        } else {
            &config.exclude
        };

        Ok(Self {
            recursive,
            follow_symlinks,
            hidden,
            include: build_globset(include_globs)?,
            exclude: build_globset(exclude_globs)?,
        })
    }

    fn file_included(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.is_match(name) {
            return false;
        }
        !self.exclude.is_match(name)
    }

    fn is_hidden(name: &str) -> bool {
        name.starts_with('.')
    }

    fn visible(&self, entry: &DirEntry) -> bool {
        // The scan roots themselves are always walked.
        entry.depth() == 0
            || self.hidden
            || !Self::is_hidden(&entry.file_name().to_string_lossy())
    }
}

pub fn run(args: &ScanArgs, config: &Config) -> Result<()> {
    let opts = ScanOptions::from_args_and_config(args, config)?;

    let dirs: Vec<PathBuf> = if args.dirs.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        args.dirs.clone()
    };

    let mut reporter = Reporter::stdio(args.json || config.json);
    let mut skipped = 0usize;

    for dir in &dirs {
        tracing::info!(dir = %dir.display(), "scanning");
        for path in collect_files(dir, &opts) {
            let result = osdb::hash_local(&path);
            if let Err(HashError::SourceTooSmall { size, .. }) = &result {
                tracing::debug!(path = %path.display(), size, "too small to hash, skipping");
                skipped += 1;
                continue;
            }
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), kind = e.kind(), error = %e, "hash failed");
            }
            reporter.record(&path.to_string_lossy(), &result)?;
        }
    }

    let (hashed, failed) = (reporter.hashed(), reporter.failed());
    reporter.note(&format!(
        "Hashed {hashed} files, skipped {skipped} too small, {failed} failed"
    ))?;
    reporter.flush()?;

    if failed > 0 {
        anyhow::bail!("{failed} files failed to hash");
    }
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Regular files under `dir` that pass the hidden and glob filters, in
/// file-name order.
fn collect_files(dir: &Path, opts: &ScanOptions) -> Vec<PathBuf> {
    let max_depth = if opts.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .follow_links(opts.follow_symlinks)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| opts.visible(e));

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        // Symlinks not followed report as symlinks here and are skipped.
        if !entry.file_type().is_file() {
            continue;
        }
        if !opts.file_included(&entry.file_name().to_string_lossy()) {
            continue;
        }
        files.push(entry.into_path());
    }
    files
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn options(recursive: bool, hidden: bool, include: &[&str], exclude: &[&str]) -> ScanOptions {
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        ScanOptions {
            recursive,
            follow_symlinks: false,
            hidden,
            include: build_globset(&include).unwrap(),
            exclude: build_globset(&exclude).unwrap(),
        }
    }

    fn layout() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let p = root.path();
        fs::write(p.join("a.mkv"), b"a").unwrap();
        fs::write(p.join("b.srt"), b"b").unwrap();
        fs::write(p.join(".c.mkv"), b"c").unwrap();
        fs::create_dir_all(p.join("season1")).unwrap();
        fs::write(p.join("season1/e01.mkv"), b"e").unwrap();
        fs::create_dir_all(p.join(".trash")).unwrap();
        fs::write(p.join(".trash/old.mkv"), b"o").unwrap();
        root
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn flat_scan_skips_subdirs_and_hidden() {
        let root = layout();
        let files = collect_files(root.path(), &options(false, false, &[], &[]));
        assert_eq!(names(root.path(), &files), vec!["a.mkv", "b.srt"]);
    }

    #[test]
    fn recursive_scan_with_include() {
        let root = layout();
        let files = collect_files(root.path(), &options(true, false, &["*.mkv"], &[]));
        assert_eq!(
            names(root.path(), &files),
            vec!["a.mkv", "season1/e01.mkv"]
        );
    }

    #[test]
    fn hidden_entries_and_excludes() {
        let root = layout();
        let files = collect_files(root.path(), &options(true, true, &[], &["*.srt"]));
        assert_eq!(
            names(root.path(), &files),
            vec![".c.mkv", ".trash/old.mkv", "a.mkv", "season1/e01.mkv"]
        );
    }

    #[test]
    fn cli_globs_replace_config_globs() {
        let args = ScanArgs {
            dirs: vec![],
            recursive: false,
            follow_symlinks: false,
            hidden: false,
            include: vec!["*.mp4".into()],
            exclude: vec![],
            json: false,
        };
        let config = Config {
            include: vec!["*.mkv".into()],
            exclude: vec!["sample*".into()],
            recursive: true,
            ..Default::default()
        };
        let opts = ScanOptions::from_args_and_config(&args, &config).unwrap();
        assert!(opts.recursive);
        assert!(opts.file_included("movie.mp4"));
        assert!(!opts.file_included("movie.mkv"));
        assert!(!opts.file_included("sample.mp4"));
    }

    #[test]
    fn bad_glob_is_an_error() {
        assert!(build_globset(&["[".to_string()]).is_err());
    }
}
