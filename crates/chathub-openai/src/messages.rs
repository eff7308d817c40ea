//! Chat-completion message parsing.

use serde::{Deserialize, Deserializer, Serialize};

use chathub_client::AskOptions;

use crate::OpenAiError;

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiMessage {
    pub role: String,
    #[serde(default, deserialize_with = "nullable_content")]
    pub content: MessageContent,
}

fn nullable_content<'de, D>(deserializer: D) -> Result<MessageContent, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<MessageContent>::deserialize(deserializer)?.unwrap_or_default())
}

/// `content` is either a plain string or a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        image_url: ImageUrl,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

impl MessageContent {
    /// Text of the message. Text parts are joined by newlines.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Last attached image, if any.
    pub fn image_url(&self) -> Option<&str> {
        match self {
            MessageContent::Text(_) => None,
            MessageContent::Parts(parts) => parts.iter().rev().find_map(|part| match part {
                ContentPart::ImageUrl { image_url } if !image_url.url.is_empty() => {
                    Some(image_url.url.as_str())
                }
                _ => None,
            }),
        }
    }
}

/// Turn inputs recovered from a message list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessages {
    pub prompt: String,
    /// Earlier messages rendered with role markers.
    pub webpage_context: String,
    pub image_url: Option<String>,
}

impl ParsedMessages {
    pub fn into_ask_options(self) -> AskOptions {
        let mut options = AskOptions::new(self.prompt).with_context(self.webpage_context);
        if let Some(url) = self.image_url {
            options = options.with_image_url(url);
        }
        options
    }
}

fn role_marker(role: &str) -> Option<&'static str> {
    match role {
        "user" => Some("[user](#message)"),
        "assistant" => Some("[assistant](#message)"),
        "system" => Some("[system](#additional_instructions)"),
        _ => None,
    }
}

/// Split a message list into prompt and context.
///
/// The last `user` message is the prompt; every other message with a known
/// role becomes context, in order. Messages with unknown roles are skipped.
pub fn parse_messages(messages: &[OpenAiMessage]) -> Result<ParsedMessages, OpenAiError> {
    let prompt_index = messages
        .iter()
        .rposition(|m| m.role == "user")
        .ok_or(OpenAiError::MissingPrompt)?;
    let last = &messages[prompt_index];

    let prompt = last.content.text();
    if prompt.is_empty() {
        return Err(OpenAiError::MissingPrompt);
    }

    let sections: Vec<String> = messages
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != prompt_index)
        .filter_map(|(_, m)| {
            role_marker(&m.role).map(|marker| format!("{marker}\n{}", m.content.text()))
        })
        .collect();
    let webpage_context = if sections.is_empty() {
        String::new()
    } else {
        format!("\n\n{}", sections.join("\n\n"))
    };

    Ok(ParsedMessages {
        prompt,
        webpage_context,
        image_url: last.content.image_url().map(str::to_string),
    })
}
