//! The single "start turn" frame sent per turn.

use serde::Serialize;

use chathub_common::{new_trace_id, TurnId};

use crate::options::{LocationHint, RequestProfile, ALLOWED_MESSAGE_TYPES};
use crate::{AskOptions, ChatHubError, Conversation};

const TURN_REQUEST_TYPE: u8 = 4;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    arguments: [Argument<'a>; 1],
    invocation_id: &'static str,
    target: &'static str,
    #[serde(rename = "type")]
    kind: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Argument<'a> {
    options_sets: &'a [String],
    source: &'static str,
    allowed_message_types: &'static [&'static str],
    slice_ids: [&'static str; 0],
    verbosity: &'static str,
    scenario: &'static str,
    trace_id: String,
    request_id: &'a str,
    is_start_of_session: bool,
    message: ArgumentMessage<'a>,
    tone: &'a str,
    conversation_signature: Option<&'a str>,
    participant: Participant<'a>,
    spoken_text_mode: &'static str,
    conversation_id: &'a str,
    previous_messages: [PreviousMessage<'a>; 1],
    gpt_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArgumentMessage<'a> {
    locale: &'a str,
    market: &'a str,
    region: &'static str,
    location: String,
    location_hints: [&'a LocationHint; 1],
    author: &'static str,
    input_method: &'static str,
    text: &'a str,
    message_type: &'static str,
    request_id: &'a str,
    message_id: &'a str,
    image_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Participant<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviousMessage<'a> {
    author: &'static str,
    description: &'a str,
    context_type: &'static str,
    message_type: &'static str,
}

/// The service accepts either label; one is picked at random per request.
fn random_message_type() -> &'static str {
    if rand::random::<bool>() {
        "Chat"
    } else {
        "CurrentWebpageContextRequest"
    }
}

/// Serialize the turn-request frame. `turn_id` is reused as both the
/// message id and the request id.
pub fn build_turn_request(
    profile: &RequestProfile,
    conversation: &Conversation,
    options: &AskOptions,
    turn_id: &TurnId,
) -> Result<String, ChatHubError> {
    let turn_id = turn_id.as_str();
    let request = ChatRequest {
        arguments: [Argument {
            options_sets: &profile.option_sets,
            source: "cib-ccp",
            allowed_message_types: ALLOWED_MESSAGE_TYPES,
            slice_ids: [],
            verbosity: "verbose",
            scenario: "SERP",
            trace_id: new_trace_id(),
            request_id: turn_id,
            is_start_of_session: true,
            message: ArgumentMessage {
                locale: &profile.locale,
                market: &profile.locale,
                region: "US",
                location: profile.location_hint.location_string(),
                location_hints: [&profile.location_hint],
                author: "user",
                input_method: "Keyboard",
                text: &options.prompt,
                message_type: random_message_type(),
                request_id: turn_id,
                message_id: turn_id,
                image_url: options.image_url.as_deref().filter(|u| !u.is_empty()),
            },
            tone: &profile.tone,
            conversation_signature: conversation
                .conversation_signature
                .as_deref()
                .filter(|s| !s.is_empty()),
            participant: Participant {
                id: &conversation.client_id,
            },
            spoken_text_mode: "None",
            conversation_id: &conversation.conversation_id,
            previous_messages: [PreviousMessage {
                author: "user",
                description: &options.webpage_context,
                context_type: "WebPage",
                message_type: "Context",
            }],
            gpt_id: &profile.gpt_id,
        }],
        invocation_id: "0",
        target: "chat",
        kind: TURN_REQUEST_TYPE,
    };
    serde_json::to_string(&request).map_err(|e| ChatHubError::Protocol(e.to_string()))
}
