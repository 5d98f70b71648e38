//! Interactive prompt
//!
//! Reads lines with rustyline, handles slash commands locally and submits
//! everything else to the [`Agent`] as one turn.

use std::path::PathBuf;

use colored::Colorize;
use log::{info, warn};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::llm::Transport;
use crate::output::{Renderer, TerminalRenderer};
use crate::runner::Agent;
use crate::storage::Snapshot;

const HISTORY_FILENAME: &str = "history.txt";
const SEPARATOR_WIDTH: usize = 60;

/// Offered after `/model `
const KNOWN_MODELS: [&str; 9] = [
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
    "gpt-4o",
    "gpt-4o-mini",
    "o1-preview",
    "o1-mini",
    "o3-mini",
];

const COMMANDS: [&str; 5] = ["/save ", "/load ", "/c", "/q", "/exit"];

/// One line of input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Quit,
    Clear,
    Model(String),
    Save(PathBuf),
    Load(PathBuf),
    /// A known command without its argument
    Usage(&'static str),
    Unknown(String),
    Prompt(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    if line == "exit" {
        return Command::Quit;
    }
    if !line.starts_with('/') {
        return Command::Prompt(line.to_string());
    }

    let (name, argument) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match (name, argument) {
        ("/q" | "/exit", _) => Command::Quit,
        ("/c", _) => Command::Clear,
        ("/model", "") => Command::Usage("/model <name>"),
        ("/model", model) => Command::Model(model.to_string()),
        ("/save", "") => Command::Usage("/save <file>"),
        ("/save", file) => Command::Save(PathBuf::from(file)),
        ("/load", "") => Command::Usage("/load <file>"),
        ("/load", file) => Command::Load(PathBuf::from(file)),
        _ => Command::Unknown(name.to_string()),
    }
}

/// Completion for a partial line: replacement start and candidates
pub fn complete_line(line: &str) -> (usize, Vec<String>) {
    if let Some(prefix) = line.strip_prefix("/model ") {
        let models = KNOWN_MODELS
            .iter()
            .filter(|m| m.starts_with(prefix))
            .map(|m| m.to_string())
            .collect();
        return ("/model ".len(), models);
    }
    if line.starts_with('/') {
        let commands = std::iter::once("/model ")
            .chain(COMMANDS)
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect();
        return (0, commands);
    }
    (0, Vec::new())
}

/// Run a local command against the agent. Returns the notice to show.
pub fn run_command<T: Transport>(agent: &mut Agent<T>, command: Command) -> Result<String, String> {
    match command {
        Command::Clear => {
            agent.clear();
            Ok("Cleared conversation".to_string())
        }
        Command::Model(model) => {
            agent.set_model(model);
            Ok(format!("Switched model to: {}", agent.model()))
        }
        Command::Save(path) => {
            agent.snapshot().save(&path).map_err(storage_message)?;
            Ok(format!("Saved conversation and model context to {}", path.display()))
        }
        Command::Load(path) => {
            let snapshot = Snapshot::load(&path).map_err(storage_message)?;
            let legacy = snapshot.is_legacy();
            agent.restore(snapshot);
            if legacy {
                Ok(format!("Loaded legacy conversation from {}", path.display()))
            } else {
                Ok(format!("Loaded conversation and restored model from {}", path.display()))
            }
        }
        Command::Usage(usage) => Err(format!("Usage: {}", usage)),
        Command::Unknown(name) => Err(format!("Unknown command: {}", name)),
        Command::Empty | Command::Quit | Command::Prompt(_) => Ok(String::new()),
    }
}

fn storage_message(error: crate::NanocodeError) -> String {
    match error {
        crate::NanocodeError::Storage(message) => message,
        other => other.to_string(),
    }
}

struct CommandHelper;

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(complete_line(&line[..pos]))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

impl Helper for CommandHelper {}

pub struct Repl<T: Transport> {
    agent: Agent<T>,
    editor: Editor<CommandHelper, DefaultHistory>,
    history_path: Option<PathBuf>,
}

impl<T: Transport> Repl<T> {
    pub fn new(agent: Agent<T>) -> eyre::Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(CommandHelper));

        let history_path = dirs::cache_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join(HISTORY_FILENAME));
        if let Some(path) = history_path.as_ref().filter(|p| p.exists())
            && let Err(e) = editor.load_history(path)
        {
            warn!("Failed to load history from {}: {}", path.display(), e);
        }

        Ok(Self {
            agent,
            editor,
            history_path,
        })
    }

    pub async fn run(&mut self) -> eyre::Result<()> {
        self.print_banner();
        println!("{}", "Available commands:".dimmed());
        println!("{}", "  /model <name>  - Switch LLM model".dimmed());
        println!("{}", "  /save <file>   - Save conversation to JSON".dimmed());
        println!("{}", "  /load <file>   - Load conversation from JSON".dimmed());
        println!("{}", "  /c             - Clear current conversation context".dimmed());
        println!("{}", "  /q or /exit    - Quit application".dimmed());
        println!();

        let mut renderer = TerminalRenderer::new();

        loop {
            println!("{}", separator());
            let line = match self.editor.readline(&format!("{} ", "❯".blue().bold())) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    renderer.error(&e.to_string());
                    break;
                }
            };
            if !line.trim().is_empty() {
                if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                    warn!("Failed to add history entry: {}", e);
                }
            }
            println!("{}", separator());

            match parse_command(&line) {
                Command::Empty => continue,
                Command::Quit => break,
                Command::Prompt(text) => self.submit(&text, &mut renderer).await,
                command => {
                    let reprint = matches!(command, Command::Model(_) | Command::Load(_));
                    match run_command(&mut self.agent, command) {
                        Ok(notice) => {
                            if reprint {
                                self.print_banner();
                            }
                            println!("{}", format!("⏺ {}", notice).green());
                        }
                        Err(message) => println!("{}", format!("⏺ {}", message).red()),
                    }
                }
            }
        }

        self.save_history();
        info!("Session ended");
        Ok(())
    }

    /// One turn, cancelled by Ctrl+C
    async fn submit(&mut self, text: &str, renderer: &mut TerminalRenderer) {
        let finished = tokio::select! {
            result = self.agent.submit(text, renderer) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match finished {
            Some(Ok(_)) => {}
            Some(Err(e)) => renderer.error(&e.to_string()),
            None => {
                renderer.response_finished();
                println!("{}", "⏺ Interrupted".yellow());
                info!("Turn interrupted by user");
            }
        }
        println!();
    }

    fn print_banner(&self) {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!("{} | {} | {}", env!("CARGO_PKG_NAME").bold(), self.agent.model(), cwd);
    }

    fn save_history(&mut self) {
        let Some(path) = &self.history_path else {
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Failed to create {}: {}", parent.display(), e);
            return;
        }
        if let Err(e) = self.editor.save_history(path) {
            warn!("Failed to save history to {}: {}", path.display(), e);
        }
    }
}

fn separator() -> String {
    "─".repeat(SEPARATOR_WIDTH).dimmed().to_string()
}
