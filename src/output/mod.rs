//! Output rendering
//!
//! The [`Renderer`] trait decouples the agent loop from the terminal.
//! [`TerminalRenderer`] prints colored output to stdout; tests use a
//! recording implementation instead.

mod indicator;

pub use indicator::ActivityIndicator;

use std::io::{self, Write};

use colored::Colorize;
use serde_json::Value;

const ARGUMENT_PREVIEW_CHARS: usize = 50;
const RESULT_PREVIEW_CHARS: usize = 60;

/// Receives everything the agent loop shows to the user
pub trait Renderer: Send {
    /// A piece of assistant text, as soon as it is available
    fn text_delta(&mut self, text: &str);

    /// The current response has no more text
    fn response_finished(&mut self) {}

    /// A tool is about to run
    fn tool_call(&mut self, name: &str, preview: &str);

    /// A tool finished; `preview` is a shortened form of its output
    fn tool_result(&mut self, preview: &str);

    /// A turn or command failed
    fn error(&mut self, message: &str);

    /// The model produced its final answer
    fn turn_finished(&mut self) {}

    /// Liveness cue shown until the first content arrives
    fn start_activity(&mut self) -> ActivityIndicator {
        ActivityIndicator::inactive()
    }
}

/// Renders to the terminal with the `⏺` / `⎿` layout
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    in_text: bool,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for TerminalRenderer {
    fn text_delta(&mut self, text: &str) {
        if !self.in_text {
            print!("\n{} ", "⏺".cyan());
            self.in_text = true;
        }
        print!("{}", text);
        io::stdout().flush().ok();
    }

    fn response_finished(&mut self) {
        if self.in_text {
            println!();
            self.in_text = false;
        }
    }

    fn tool_call(&mut self, name: &str, preview: &str) {
        println!("\n{}({})", format!("⏺ {}", name).green(), preview.dimmed());
    }

    fn tool_result(&mut self, preview: &str) {
        println!("  {}", format!("⎿  {}", preview).dimmed());
    }

    fn error(&mut self, message: &str) {
        self.response_finished();
        println!("{}", format!("\n⏺ Error: {}", message).red());
    }

    fn turn_finished(&mut self) {
        println!();
    }

    fn start_activity(&mut self) -> ActivityIndicator {
        ActivityIndicator::start()
    }
}

/// First argument value as JSON, cut to 50 characters
pub fn argument_preview(arguments: &Value) -> String {
    let first = match arguments {
        Value::Object(map) => map.values().next(),
        _ => None,
    };
    first
        .map(|value| truncate(&value.to_string(), ARGUMENT_PREVIEW_CHARS))
        .unwrap_or_default()
}

/// First line of a tool result, cut to 60 characters
pub fn result_preview(output: &str) -> String {
    match output.split_once('\n') {
        Some((first, _)) => format!("{} ... + lines", truncate(first, RESULT_PREVIEW_CHARS)),
        None if output.chars().count() > RESULT_PREVIEW_CHARS => {
            format!("{}...", truncate(output, RESULT_PREVIEW_CHARS))
        }
        None => output.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
