//! chathub: streaming command-line client for the ChatHub service.

mod cli;
mod render;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chathub_client::{AskOptions, ChatHubClient, ChatHubError, ClientConfig};
use chathub_config::{ChatHubConfig, LogLevel};
use chathub_openai::{parse_messages, OpenAiError, OpenAiMessage};

use crate::cli::Args;
use crate::render::{render, Output};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ChatHubError),
    #[error(transparent)]
    Messages(#[from] OpenAiError),
    #[error("failed to read messages file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed messages file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("a prompt or --messages is required")]
    MissingPrompt,
}

fn load_config(path: Option<&Path>) -> (ChatHubConfig, Option<String>) {
    let result = match path {
        Some(path) => chathub_config::toml_loader::load_from_path(path),
        None => chathub_config::load_config(),
    };
    match result {
        Ok(config) => (config, None),
        Err(e) => (ChatHubConfig::default(), Some(e.to_string())),
    }
}

fn init_logging(flag: Option<&str>, configured: LogLevel) {
    let fallback = format!("chathub={0},chathub_client={0}", configured.as_directive());
    let directive = flag.map(str::to_string).unwrap_or(fallback);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_options(args: &Args) -> Result<AskOptions, CliError> {
    let mut options = match &args.messages {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let messages: Vec<OpenAiMessage> = serde_json::from_str(&raw)?;
            parse_messages(&messages)?.into_ask_options()
        }
        None => {
            let prompt = args.prompt.as_deref().ok_or(CliError::MissingPrompt)?;
            AskOptions::new(prompt).with_context(args.context.clone().unwrap_or_default())
        }
    };
    if let Some(url) = &args.image_url {
        options = options.with_image_url(url.clone());
    }
    if let Some(style) = args.style {
        options = options.with_style(style);
    }
    Ok(options)
}

async fn run(args: Args, config: ChatHubConfig) -> Result<bool, CliError> {
    let client = ChatHubClient::new(ClientConfig::from(&config))?;

    let cancel = CancellationToken::new();
    let options = build_options(&args)?.with_cancel(cancel.clone());

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling turn");
                cancel.cancel();
            }
        }
    });

    let mut events = client.ask_stream(options).await?;
    let mut failed = false;
    let mut stdout = std::io::stdout();
    while let Some(event) = events.recv().await {
        failed |= event.error().is_some();
        match render(&event, args.json) {
            Output::Stdout(text) => {
                print!("{text}");
                let _ = stdout.flush();
            }
            Output::Line(line) => println!("{line}"),
            Output::Stderr(line) => eprintln!("\n{line}"),
        }
    }
    if !args.json {
        println!();
    }
    Ok(!failed)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let (config, config_error) = load_config(args.config.as_deref());
    init_logging(args.log_level.as_deref(), config.logging.level);
    if let Some(e) = config_error {
        warn!("Config load failed, using defaults: {e}");
    }
    info!("chathub v{} starting", env!("CARGO_PKG_VERSION"));

    match run(args, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
