//! Frame-to-event state machine.
//!
//! Consumes one decoded frame at a time and emits zero or more [`Event`]s.
//! Holds the per-turn text cursor and the citation accumulator.

mod message;


use serde_json::Value;
use tracing::{debug, info, warn};

use crate::attribution::{render_attributes, SourceAttribute, SourceAttributionAccumulator};
use crate::event::GenerativeImage;
use crate::{ChatHubError, Event};

use message::{
    frame_type, MessageKind, CONTENT_TYPE_IMAGE, NO_RESULT_MARKER, ORIGIN_APOLOGY,
    ORIGIN_CODE_INTERPRETER, SUCCESS,
};

/// Output of translating one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub events: Vec<Event>,
    /// The turn ends after this frame.
    pub finished: bool,
}

impl Translation {
    fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    fn finish(mut self) -> Self {
        self.finished = true;
        self
    }
}

/// Per-turn translator state.
#[derive(Debug, Default)]
pub struct EventTranslator {
    /// Characters of running text already emitted as text deltas.
    wrote: usize,
    sources: SourceAttributionAccumulator,
    /// Prompt of the turn, for log context.
    prompt: String,
}

impl EventTranslator {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Current emission cursor, in characters.
    pub fn cursor(&self) -> usize {
        self.wrote
    }

    pub fn sources(&self) -> &SourceAttributionAccumulator {
        &self.sources
    }

    /// Translate one decoded frame.
    pub fn translate(&mut self, frame: &Value) -> Translation {
        match frame.get("type").and_then(Value::as_i64) {
            Some(frame_type::UPDATE) => match frame.pointer("/arguments/0/messages/0") {
                Some(message) => self.translate_update(frame, message),
                None => Translation::default(),
            },
            Some(frame_type::TERMINAL) => self.translate_terminal(frame),
            other => {
                debug!(frame_type = ?other, "Ignoring frame");
                Translation::default()
            }
        }
    }

    fn translate_terminal(&mut self, frame: &Value) -> Translation {
        let mut out = Translation::default();

        if let Some(value) = frame.pointer("/item/result/value").and_then(Value::as_str) {
            if value != SUCCESS {
                let message = str_at(frame, "/item/result/message");
                warn!(value = %value, message = %message, "Turn ended with remote error");
                out.push(Event::Error(ChatHubError::Remote {
                    value: value.to_string(),
                    message: message.to_string(),
                }));
                return out.finish();
            }
        }

        // Most recent message first.
        if let Some(last) = frame
            .pointer("/item/messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.last())
        {
            if let Some(event) = suggested_responses(last) {
                out.push(event);
            }
        }
        out.finish()
    }

    fn translate_update(&mut self, frame: &Value, message: &Value) -> Translation {
        let mut out = Translation::default();
        let text = str_at(message, "/text");
        let content_origin = str_at(message, "/contentOrigin");
        let message_type = str_at(message, "/messageType");

        match MessageKind::from(message_type) {
            MessageKind::InternalSearchQuery => out.push(Event::SearchQuery(text.to_string())),
            MessageKind::InternalSearchResult => self.collect_search_results(message),
            MessageKind::InternalLoaderMessage => out.push(Event::Loading(loader_text(message))),
            MessageKind::GenerateContentQuery => {
                if str_at(message, "/contentType") == CONTENT_TYPE_IMAGE {
                    let image = GenerativeImage::new(text, str_at(message, "/messageId"));
                    match serde_json::to_string(&image) {
                        Ok(json) => out.push(Event::GenerativeImage(json)),
                        Err(e) => warn!(error = %e, "Failed to encode generative image"),
                    }
                }
            }
            MessageKind::Progress => {
                if content_origin == ORIGIN_CODE_INTERPRETER {
                    let invocation = str_at(message, "/invocation");
                    if !invocation.is_empty() {
                        out.push(Event::ExecutingTask(invocation.to_string()));
                    }
                } else {
                    warn!(
                        content_origin = %content_origin,
                        triggered_by = %self.prompt,
                        response = %message,
                        "Unsupported progress type"
                    );
                }
            }
            MessageKind::GeneratedCode => out.push(Event::GeneratedCode(text.to_string())),
            MessageKind::Chat => {
                if frame.pointer("/arguments/0/cursor").is_some() {
                    self.wrote = 0;
                    if let Some(event) = self.resolve_citations(message, text) {
                        out.push(event);
                    }
                }

                if content_origin == ORIGIN_APOLOGY {
                    let err = if self.wrote != 0 {
                        ChatHubError::Revoked
                    } else {
                        ChatHubError::Filtered
                    };
                    info!(error = %err, "Turn withdrawn by the service");
                    out.push(Event::Error(err));
                    return out.finish();
                }

                if let Some(delta) = self.advance(text) {
                    out.push(Event::Text(delta));
                }
                if let Some(event) = suggested_responses(message) {
                    out.push(event);
                }
            }
            MessageKind::Unrecognized(other) => {
                warn!(
                    message_type = %other,
                    triggered_by = %self.prompt,
                    response = %message,
                    "Unsupported message type"
                );
            }
        }
        out
    }

    /// Move the cursor to the end of `text`, returning the unseen suffix.
    ///
    /// A shorter `text` means the service retracted trailing characters:
    /// the cursor rewinds silently.
    fn advance(&mut self, text: &str) -> Option<String> {
        let len = text.chars().count();
        if len > self.wrote {
            let delta: String = text.chars().skip(self.wrote).collect();
            self.wrote = len;
            Some(delta)
        } else {
            self.wrote = len;
            None
        }
    }

    fn collect_search_results(&mut self, message: &Value) {
        if str_at(message, "/hiddenText").contains(NO_RESULT_MARKER) {
            info!("Web search returned no relevant result");
            return;
        }
        let text = str_at(message, "/text");
        let parsed: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "Skipping unparseable search result");
                return;
            }
        };

        let mut found = Vec::new();
        for group in items(&parsed) {
            let Some(fields) = group.as_object() else {
                continue;
            };
            for value in fields.values() {
                for entry in items(value) {
                    found.push(SourceAttribute::new(
                        str_at(entry, "/url"),
                        str_at(entry, "/title"),
                    ));
                }
            }
        }
        debug!(count = found.len(), "Collected citation candidates");
        self.sources.add(found);
    }

    /// Isolate the footnote block from the card text and index the cited sources.
    fn resolve_citations(&self, message: &Value, text: &str) -> Option<Event> {
        let card = str_at(message, "/adaptiveCards/0/body/0/text");
        let block = card.strip_suffix(text).unwrap_or(card);
        if block.trim().is_empty() {
            return None;
        }
        let lines = block
            .split('\n')
            .map(|line| line.trim_matches(|c| c == ' ' || c == '"'))
            .filter(|line| !line.is_empty());
        let resolved = self.sources.resolve(lines);
        if resolved.is_empty() {
            return None;
        }
        Some(Event::SearchResult(render_attributes(&resolved)))
    }
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> &'a str {
    value.pointer(pointer).and_then(Value::as_str).unwrap_or("")
}

/// Array elements, or the value itself when it is a single non-null item.
fn items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(arr) => arr.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn loader_text(message: &Value) -> String {
    if let Some(hidden) = message.get("hiddenText") {
        return hidden.as_str().unwrap_or_default().to_string();
    }
    if let Some(text) = message.get("text") {
        return text.as_str().unwrap_or_default().to_string();
    }
    message.to_string()
}

fn suggested_responses(message: &Value) -> Option<Event> {
    let suggestions = message.get("suggestedResponses")?;
    let texts: Vec<&str> = items(suggestions)
        .into_iter()
        .map(|s| str_at(s, "/text"))
        .collect();
    serde_json::to_string(&texts)
        .ok()
        .map(Event::SuggestedResponses)
}
