//! Known `messageType` values of update frames.

/// Closed set of message sub-types the translator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageKind<'a> {
    /// Empty sub-type: the assistant is talking.
    Chat,
    InternalSearchQuery,
    InternalSearchResult,
    InternalLoaderMessage,
    GenerateContentQuery,
    Progress,
    GeneratedCode,
    Unrecognized(&'a str),
}

impl<'a> From<&'a str> for MessageKind<'a> {
    fn from(value: &'a str) -> Self {
        match value {
            "" => MessageKind::Chat,
            "InternalSearchQuery" => MessageKind::InternalSearchQuery,
            "InternalSearchResult" => MessageKind::InternalSearchResult,
            "InternalLoaderMessage" => MessageKind::InternalLoaderMessage,
            "GenerateContentQuery" => MessageKind::GenerateContentQuery,
            "Progress" => MessageKind::Progress,
            "GeneratedCode" => MessageKind::GeneratedCode,
            other => MessageKind::Unrecognized(other),
        }
    }
}

/// `type` field of a frame.
pub(crate) mod frame_type {
    pub const UPDATE: i64 = 1;
    pub const TERMINAL: i64 = 2;
}

pub(crate) const SUCCESS: &str = "Success";
pub(crate) const NO_RESULT_MARKER: &str = "Web search returned no relevant result";
pub(crate) const ORIGIN_APOLOGY: &str = "Apology";
pub(crate) const ORIGIN_CODE_INTERPRETER: &str = "CodeInterpreter";
pub(crate) const CONTENT_TYPE_IMAGE: &str = "IMAGE";
