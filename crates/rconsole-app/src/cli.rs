use clap::Parser;
use std::path::PathBuf;

/// rconsole: terminal front end for a remote command console.
#[derive(Parser, Debug)]
#[command(name = "rconsole", version, about)]
pub struct Args {
    /// Relay URL (default: `server.url` from config).
    pub server_url: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
