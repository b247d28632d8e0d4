use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "osdbhash", about = "Compute OSDB hashes for local files and HTTP(S) URLs")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Hash the given files or URLs
    Hash(HashArgs),
    /// Hash every file in the given directories
    Scan(ScanArgs),
}

#[derive(Args)]
pub struct HashArgs {
    /// Local paths or http(s):// URLs
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Print one JSON object per source
    #[arg(long)]
    pub json: bool,

    /// Deadline in seconds for all requests made for one URL
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directories to scan (default: current directory)
    pub dirs: Vec<PathBuf>,

    /// Scan subdirectories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Include only files matching these glob patterns
    #[arg(long, value_name = "GLOB")]
    pub include: Vec<String>,

    /// Exclude files matching these glob patterns
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Print one JSON object per file
    #[arg(long)]
    pub json: bool,
}
