//! Chat-completion response shapes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use chathub_client::Event;

const COMPLETION_ID: &str = "chatcmpl-123";
const SYSTEM_FINGERPRINT: &str = "fp_44709d6fcb";
/// Token counts are not reported by the service.
const PLACEHOLDER_TOKENS: u32 = 1024;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Stop,
    Length,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDelta {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChoiceDelta,
    pub finish_reason: Option<FinishReason>,
}

/// One streamed `chat.completion.chunk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub system_fingerprint: String,
    pub choices: Vec<ChunkChoice>,
}

impl ChatCompletionChunk {
    pub fn new(model: &str, delta: &str, finish_reason: Option<FinishReason>) -> Self {
        Self {
            id: COMPLETION_ID.into(),
            object: "chat.completion.chunk".into(),
            created: now(),
            model: model.into(),
            system_fingerprint: SYSTEM_FINGERPRINT.into(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChoiceDelta {
                    role: "assistant".into(),
                    content: delta.into(),
                },
                finish_reason,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub index: u32,
    pub message: ChoiceMessage,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Non-streamed `chat.completion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub system_fingerprint: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Usage,
}

impl ChatCompletion {
    pub fn new(model: &str, content: &str, finish_reason: FinishReason) -> Self {
        Self {
            id: COMPLETION_ID.into(),
            object: "chat.completion".into(),
            created: now(),
            model: model.into(),
            system_fingerprint: SYSTEM_FINGERPRINT.into(),
            choices: vec![CompletionChoice {
                index: 0,
                message: ChoiceMessage {
                    role: "assistant".into(),
                    content: content.into(),
                },
                finish_reason,
            }],
            usage: Usage {
                prompt_tokens: PLACEHOLDER_TOKENS,
                completion_tokens: PLACEHOLDER_TOKENS,
                total_tokens: PLACEHOLDER_TOKENS * 2,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    pub url: String,
    pub revised_prompt: String,
}

/// Image-generation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGeneration {
    pub created: i64,
    pub data: Vec<ImageObject>,
}

impl ImageGeneration {
    /// Query strings are stripped from the image URLs.
    pub fn new<'a>(revised_prompt: &str, urls: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            created: now(),
            data: urls
                .into_iter()
                .map(|url| ImageObject {
                    url: url.split('?').next().unwrap_or(url).to_string(),
                    revised_prompt: revised_prompt.to_string(),
                })
                .collect(),
        }
    }
}

/// Folds a turn's events into chunks and a final completion.
///
/// Only text deltas reach the completion; an error event marks the answer
/// as cut short.
#[derive(Debug, Clone)]
pub struct CompletionCollector {
    model: String,
    content: String,
    truncated: bool,
}

impl CompletionCollector {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            content: String::new(),
            truncated: false,
        }
    }

    /// Record one event, returning the chunk to stream for it, if any.
    pub fn push(&mut self, event: &Event) -> Option<ChatCompletionChunk> {
        match event {
            Event::Text(delta) => {
                self.content.push_str(delta);
                Some(ChatCompletionChunk::new(&self.model, delta, None))
            }
            Event::Error(err) => {
                debug!(error = %err, "Completion cut short");
                self.truncated = true;
                None
            }
            _ => None,
        }
    }

    pub fn finish_reason(&self) -> FinishReason {
        if self.truncated {
            FinishReason::Length
        } else {
            FinishReason::Stop
        }
    }

    /// Closing chunk with an empty delta and the finish reason.
    pub fn final_chunk(&self) -> ChatCompletionChunk {
        ChatCompletionChunk::new(&self.model, "", Some(self.finish_reason()))
    }

    pub fn into_completion(self) -> ChatCompletion {
        let reason = self.finish_reason();
        ChatCompletion::new(&self.model, &self.content, reason)
    }
}

#[cfg(test)]
mod tests {
    use chathub_client::ChatHubError;
    use serde_json::Value;

    use super::*;

    #[test]
    fn chunk_shape() {
        let chunk = ChatCompletionChunk::new("gpt-4", "Hel", None);
        let v: Value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(v["object"], "chat.completion.chunk");
        assert_eq!(v["model"], "gpt-4");
        assert_eq!(v["choices"][0]["delta"]["role"], "assistant");
        assert_eq!(v["choices"][0]["delta"]["content"], "Hel");
        assert!(v["choices"][0]["finish_reason"].is_null());
    }

    #[test]
    fn completion_shape() {
        let completion = ChatCompletion::new("gpt-4", "Hello", FinishReason::Stop);
        let v: Value = serde_json::to_value(&completion).unwrap();
        assert_eq!(v["object"], "chat.completion");
        assert_eq!(v["choices"][0]["message"]["content"], "Hello");
        assert_eq!(v["choices"][0]["finish_reason"], "stop");
        assert_eq!(v["usage"]["total_tokens"], 2048);
    }

    #[test]
    fn image_urls_lose_query() {
        let images = ImageGeneration::new(
            "a fox",
            ["https://th.example/a.jpg?w=270&h=270", "https://th.example/b.jpg"],
        );
        assert_eq!(images.data.len(), 2);
        assert_eq!(images.data[0].url, "https://th.example/a.jpg");
        assert_eq!(images.data[1].url, "https://th.example/b.jpg");
        assert_eq!(images.data[0].revised_prompt, "a fox");
    }

    #[test]
    fn collector_streams_text_and_ignores_other_events() {
        let mut collector = CompletionCollector::new("gpt-4");
        assert!(collector.push(&Event::SearchQuery("rust".into())).is_none());
        let chunk = collector.push(&Event::Text("Hi".into())).unwrap();
        assert_eq!(chunk.choices[0].delta.content, "Hi");
        collector.push(&Event::Text(" there".into()));

        assert_eq!(collector.final_chunk().choices[0].finish_reason, Some(FinishReason::Stop));
        let completion = collector.into_completion();
        assert_eq!(completion.choices[0].message.content, "Hi there");
        assert_eq!(completion.choices[0].finish_reason, FinishReason::Stop);
    }

    #[test]
    fn collector_marks_errors_as_length() {
        let mut collector = CompletionCollector::new("gpt-4");
        collector.push(&Event::Text("Partial".into()));
        collector.push(&Event::Error(ChatHubError::Revoked));
        assert_eq!(collector.finish_reason(), FinishReason::Length);
        assert_eq!(collector.into_completion().choices[0].message.content, "Partial");
    }
}
