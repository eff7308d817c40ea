use std::path::PathBuf;

use clap::Parser;

use chathub_client::ConversationStyle;

/// chathub: ask one prompt and stream the answer.
#[derive(Parser, Debug)]
#[command(name = "chathub", version, about)]
pub struct Args {
    /// Prompt text. Optional when `--messages` is given.
    pub prompt: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Conversation style (Creative, Balanced, Precise, Designer).
    #[arg(long, value_parser = parse_style)]
    pub style: Option<ConversationStyle>,

    /// Prior conversation or webpage context.
    #[arg(long)]
    pub context: Option<String>,

    /// Image to attach to the prompt.
    #[arg(long)]
    pub image_url: Option<String>,

    /// JSON file holding an OpenAI-style message list.
    #[arg(long, conflicts_with_all = ["prompt", "context"])]
    pub messages: Option<PathBuf>,

    /// Print one JSON object per event.
    #[arg(long)]
    pub json: bool,
}

fn parse_style(value: &str) -> Result<ConversationStyle, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| format!("unknown style '{value}'"))
}

pub fn parse() -> Args {
    Args::parse()
}
