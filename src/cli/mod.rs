//! CLI module for nanocode - command-line flags.

pub mod commands;

pub use commands::Cli;
