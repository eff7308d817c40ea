//! Terminal rendering of turn events.

use chathub_client::{Event, EventRecord};

/// Where a rendered event goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Answer text, written without a trailing newline.
    Stdout(String),
    /// Status lines.
    Stderr(String),
    /// One JSON record per line.
    Line(String),
}

pub fn render(event: &Event, json: bool) -> Output {
    if json {
        let record = EventRecord::from(event);
        return match serde_json::to_string(&record) {
            Ok(line) => Output::Line(line),
            Err(e) => Output::Stderr(format!("failed to encode event: {e}")),
        };
    }
    match event {
        Event::Text(delta) => Output::Stdout(delta.clone()),
        Event::SearchQuery(query) => Output::Stderr(format!("[searching] {query}")),
        Event::SearchResult(sources) => Output::Stderr(format!("[sources]\n{sources}")),
        Event::Loading(status) => Output::Stderr(format!("[loading] {status}")),
        Event::GenerativeImage(image) => Output::Stderr(format!("[image] {image}")),
        Event::GeneratedCode(code) => Output::Stderr(format!("[code]\n{code}")),
        Event::ExecutingTask(task) => Output::Stderr(format!("[executing] {task}")),
        Event::SuggestedResponses(list) => Output::Stderr(format!("[suggestions] {list}")),
        Event::ResolvingCaptcha(status) => Output::Stderr(format!("[captcha] {status}")),
        Event::Error(err) => Output::Stderr(format!("error: {err}")),
    }
}
