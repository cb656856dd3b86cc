use std::path::PathBuf;

use clap::Parser;

/// Forwards VK community callbacks to a Telegram chat.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Path to the YAML config file.
    #[arg(long, short = 'c')]
    pub config: PathBuf,
}
