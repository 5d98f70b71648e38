//! CLI definitions using clap.
//!
//! nanocode has no subcommands: it always starts the interactive prompt.

use clap::Parser;
use std::path::PathBuf;

/// nanocode - a terminal coding assistant
#[derive(Parser, Debug)]
#[command(name = "nanocode")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model for the first turn (overrides MODEL and the config file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Wait for complete responses instead of streaming them
    #[arg(long)]
    pub no_stream: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}
