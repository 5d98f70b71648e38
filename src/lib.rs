//! nanocode - a terminal coding assistant
//!
//! nanocode runs an agentic loop against Anthropic-style and OpenAI-compatible
//! chat APIs: it streams the model's answer, runs the local tools the model
//! asks for, and feeds their results back until the model is done.

pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod repl;
pub mod runner;
pub mod storage;

pub use error::{NanocodeError, Result};
