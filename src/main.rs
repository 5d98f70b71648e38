use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use nanocode::config::{self, Config};
use nanocode::llm::tools::{ToolContext, ToolExecutor};
use nanocode::llm::{Credentials, HttpTransport};
use nanocode::repl::Repl;
use nanocode::runner::{Agent, AgentSettings};

mod cli;

use cli::Cli;

fn setup_logging(default_level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nanocode")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("nanocode.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    config::load_env_files();
    let credentials = Credentials::from_env();
    if credentials.is_empty() {
        eyre::bail!(
            "Must set ANTHROPIC_API_KEY, OPENROUTER_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY in environment"
        );
    }

    let env_model = std::env::var("MODEL").ok();
    let model = config::initial_model(cli.model.as_deref(), env_model.as_deref(), &config.llm, &credentials);

    let mut settings = AgentSettings::from(&config.llm);
    if cli.no_stream {
        settings.stream = false;
    }
    info!("Initial model {} (stream={})", model, settings.stream);

    let transport = HttpTransport::new(Duration::from_millis(config.llm.connect_timeout_ms));
    let tools = ToolExecutor::standard(ToolContext::current_dir().with_echo_output(true));
    let agent = Agent::new(transport, tools, model, credentials, settings);

    let mut repl = Repl::new(agent).context("Failed to start line editor")?;
    repl.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging as soon as the level is known
    let level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };
    setup_logging(level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
