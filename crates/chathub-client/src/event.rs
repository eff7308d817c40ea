//! Public events produced by a turn.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ChatHubError;

/// One unit of the public event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// New suffix of the assistant's running text.
    Text(String),
    SearchQuery(String),
    /// JSON array of indexed [`crate::SourceAttribute`]s.
    SearchResult(String),
    Loading(String),
    /// JSON-encoded [`GenerativeImage`].
    GenerativeImage(String),
    GeneratedCode(String),
    ExecutingTask(String),
    /// JSON array of suggestion strings.
    SuggestedResponses(String),
    ResolvingCaptcha(String),
    Error(ChatHubError),
}

/// Discriminant of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Text,
    SearchQuery,
    SearchResult,
    Loading,
    GenerativeImage,
    GeneratedCode,
    ExecutingTask,
    SuggestedResponses,
    ResolvingCaptcha,
    Error,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Text(_) => EventKind::Text,
            Event::SearchQuery(_) => EventKind::SearchQuery,
            Event::SearchResult(_) => EventKind::SearchResult,
            Event::Loading(_) => EventKind::Loading,
            Event::GenerativeImage(_) => EventKind::GenerativeImage,
            Event::GeneratedCode(_) => EventKind::GeneratedCode,
            Event::ExecutingTask(_) => EventKind::ExecutingTask,
            Event::SuggestedResponses(_) => EventKind::SuggestedResponses,
            Event::ResolvingCaptcha(_) => EventKind::ResolvingCaptcha,
            Event::Error(_) => EventKind::Error,
        }
    }

    /// Text payload. For errors, the error's display string.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Event::Text(s)
            | Event::SearchQuery(s)
            | Event::SearchResult(s)
            | Event::Loading(s)
            | Event::GenerativeImage(s)
            | Event::GeneratedCode(s)
            | Event::ExecutingTask(s)
            | Event::SuggestedResponses(s)
            | Event::ResolvingCaptcha(s) => Cow::Borrowed(s),
            Event::Error(err) => Cow::Owned(err.to_string()),
        }
    }

    pub fn error(&self) -> Option<&ChatHubError> {
        match self {
            Event::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// Flat serializable view of an [`Event`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub text: String,
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        Self {
            kind: event.kind(),
            text: event.text().into_owned(),
        }
    }
}

/// Payload of [`Event::GenerativeImage`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerativeImage {
    pub text: String,
    pub url: String,
}

const IMAGE_CREATE_BASE: &str = "https://www.bing.com/images/create?\
    partner=sydney&re=1&showselective=1&sude=1&kseed=7500&SFX=2&gptexp=unknown";

impl GenerativeImage {
    /// Build the image-service link for `prompt`, correlated to the
    /// originating message through `iframeid`.
    pub fn new(prompt: &str, message_id: &str) -> Self {
        Self {
            text: prompt.to_string(),
            url: format!(
                "{IMAGE_CREATE_BASE}&q={}&iframeid={message_id}",
                query_escape(prompt)
            ),
        }
    }
}

/// Form-style query escaping: spaces become `+`.
fn query_escape(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Event::Text("a".into()).kind(), EventKind::Text);
        assert_eq!(
            Event::Error(ChatHubError::Filtered).kind(),
            EventKind::Error
        );
    }

    #[test]
    fn error_text_is_display_string() {
        let event = Event::Error(ChatHubError::Revoked);
        assert_eq!(event.text(), "Message revoke detected");
        assert_eq!(event.error(), Some(&ChatHubError::Revoked));
    }

    #[test]
    fn record_serializes_snake_case_kind() {
        let record = EventRecord::from(&Event::SuggestedResponses("[]".into()));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"type":"suggested_responses","text":"[]"}"#);
    }

    #[test]
    fn generative_image_url_is_escaped_and_correlated() {
        let image = GenerativeImage::new("a cat & a dog", "msg-1");
        assert_eq!(image.text, "a cat & a dog");
        assert!(image
            .url
            .starts_with("https://www.bing.com/images/create?partner=sydney&re=1"));
        assert!(image.url.contains("&gptexp=unknown&q=a+cat+%26+a+dog"));
        assert!(image.url.ends_with("&iframeid=msg-1"));
    }

    #[test]
    fn query_escape_uses_plus_for_spaces() {
        assert_eq!(query_escape("1 + 1"), "1+%2B+1");
        assert_eq!(query_escape("a~b-c_d.e"), "a~b-c_d.e");
        assert_eq!(query_escape("x/y?z"), "x%2Fy%3Fz");
    }
}
