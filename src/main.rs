use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::{Result, WrapErr};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use research_chat::cli::chat::ChatContext;
use research_chat::{Config, DeepSeekClient, ResponseCoordinator};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input to send to the chat
    #[arg(short, long)]
    input: Option<String>,

    /// Override the model named by DEEPSEEK_MODEL
    #[arg(short, long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Input to send to the chat
        #[arg(short, long)]
        input: Option<String>,

        /// Override the model named by DEEPSEEK_MODEL
        #[arg(short, long)]
        model: Option<String>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let (input, model, verbose) = match cli.command {
        Some(Commands::Chat { input, model, verbose }) => (input, model, verbose),
        None => (cli.input, cli.model, cli.verbose),
    };

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("Failed to set tracing subscriber")?;

    // Missing or invalid configuration stops the process here
    let mut config = Config::from_env().wrap_err("Failed to load configuration")?;
    if let Some(model) = model {
        config.model = model;
    }

    info!("Starting research chat with model {}", config.model);

    let client = DeepSeekClient::new(&config);
    let session = ResponseCoordinator::from_config(client, &config);

    let mut chat_context = ChatContext::new(Box::new(io::stdout()), input, true, session);
    chat_context.run().await
}
