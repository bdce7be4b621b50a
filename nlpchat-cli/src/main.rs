//! CLI entry point for nlpchat

mod repl;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input};
use nlpchat_core::config::{Config, ConfigLoader};
use nlpchat_core::logging::init_logging;
use nlpchat_core::session::SessionManager;
use nlpchat_providers::{LlmProvider, Message, OpenRouterClient};
use repl::{ChatSettings, CommandLoop, LoopAction};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "nlpchat")]
#[command(about = "A command-line NLP chatbot backed by OpenRouter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive chat prompt
    Chat {
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
        /// Load a saved conversation before starting
        #[arg(short, long)]
        load: Option<String>,
    },
    /// Send a single message and print the reply
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: String,
        /// Model to use
        #[arg(long)]
        model: Option<String>,
    },
    /// Initialize nlpchat configuration
    Onboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    match cli.command {
        Commands::Chat { model, load } => {
            let config = loader.load()?;
            let _guard = init_logging(&config.logging);
            run_chat(config, model, load).await?;
        }
        Commands::Ask { message, model } => {
            let config = loader.load()?;
            let _guard = init_logging(&config.logging);
            run_ask(config, &message, model).await?;
        }
        Commands::Onboard => {
            run_onboard(&loader)?;
        }
    }

    Ok(())
}

/// Expand tilde in path
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn build_provider(config: &Config, api_key: Option<String>) -> OpenRouterClient {
    OpenRouterClient::new(
        api_key,
        config.provider.api_base.clone(),
        config.chat.model.clone(),
        Some(config.provider.referer.clone()),
        Some(config.provider.title.clone()),
    )
}

/// Resolve the API key: config/environment first, otherwise ask. An empty
/// answer is allowed; chat attempts then report the missing credential.
fn resolve_api_key(config: &Config) -> Result<Option<String>> {
    if !config.provider.api_key.trim().is_empty() {
        return Ok(Some(config.provider.api_key.clone()));
    }

    println!(
        "{}",
        style("OpenRouter API key not found in configuration or environment.").yellow()
    );
    let entered: String = Input::new()
        .with_prompt("Enter your OpenRouter API key (leave empty to continue without one)")
        .allow_empty(true)
        .interact_text()?;

    let entered = entered.trim().to_string();
    if entered.is_empty() {
        warn!("Starting without an API key; chat requests will fail until one is set");
        Ok(None)
    } else {
        Ok(Some(entered))
    }
}

/// Run the interactive chat prompt
async fn run_chat(config: Config, model: Option<String>, load: Option<String>) -> Result<()> {
    let sessions_dir = expand_tilde(&config.chat.sessions_dir);

    let api_key = resolve_api_key(&config)?;
    let provider = Arc::new(build_provider(&config, api_key));
    let selected_model = model.unwrap_or_else(|| provider.default_model());

    println!("{}", style("NLP Chatbot").bold().cyan());
    println!("Model: {}", selected_model);
    println!(
        "Type {} for commands or start chatting!",
        style("/help").cyan()
    );

    let settings = ChatSettings {
        model: selected_model,
        max_tokens: config.chat.max_tokens,
        temperature: config.chat.temperature as f64,
        system_prompt: config.chat.system_prompt.clone(),
    };
    let manager = SessionManager::new(&sessions_dir);
    let initial = load.map(|name| manager.load(&name));
    let mut command_loop = CommandLoop::new(provider, manager, settings);

    match initial {
        Some(Ok(session)) => {
            println!(
                "{} ({} turns)",
                style("Conversation loaded.").green(),
                session.len()
            );
            command_loop.replace_session(session);
        }
        Some(Err(e)) => println!("{} {}", style("Error loading conversation:").red(), e),
        None => {}
    }

    info!("Starting interactive chat loop");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("\n{} ", style("you:").cyan().bold());
        io::stdout().flush()?;

        line.clear();
        // EOF ends the loop like /quit
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }

        if command_loop.handle_line(&line).await == LoopAction::Quit {
            break;
        }
    }

    Ok(())
}

/// Send one message and print the reply
async fn run_ask(config: Config, message: &str, model: Option<String>) -> Result<()> {
    let api_key = resolve_api_key(&config)?;
    let provider = build_provider(&config, api_key);
    let selected_model = model.unwrap_or_else(|| provider.default_model());

    let messages = vec![
        Message::system(&config.chat.system_prompt),
        Message::user(message),
    ];

    println!("{}", style("Processing...").cyan());
    match provider
        .chat(
            messages,
            Some(selected_model),
            config.chat.max_tokens,
            config.chat.temperature as f64,
        )
        .await
    {
        Ok(reply) => {
            let content = reply.content.unwrap_or_default();
            println!("\n{}", style("Response:").bold());
            println!("{}", content);
            Ok(())
        }
        Err(e) => {
            anyhow::bail!("Failed to process message: {}", e);
        }
    }
}

/// Run the onboard wizard
fn run_onboard(loader: &ConfigLoader) -> Result<()> {
    println!("{}", style("Welcome to nlpchat!").bold().cyan());
    println!("Let's set up your configuration.\n");

    let config_path = loader.config_dir().join("config.json");
    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Onboard cancelled.");
            return Ok(());
        }
    }

    let api_key: String = Input::new()
        .with_prompt("Enter your OpenRouter API key")
        .interact_text()?;

    let mut config = Config::default();
    let model: String = Input::new()
        .with_prompt("Enter the model to use")
        .default(config.chat.model.clone())
        .interact_text()?;

    config.chat.model = model;
    config.provider.api_key = api_key;
    loader.save(&config)?;

    std::fs::create_dir_all(expand_tilde(&config.chat.sessions_dir))?;

    println!(
        "\n{}",
        style("Configuration saved successfully!").green().bold()
    );
    println!("Config location: {}", config_path.display());
    println!("\nYou can now run:");
    println!("  {} - Start chatting", style("nlpchat chat").cyan());
    println!(
        "  {} - One-shot question",
        style("nlpchat ask --message 'What is stemming?'").cyan()
    );

    Ok(())
}
