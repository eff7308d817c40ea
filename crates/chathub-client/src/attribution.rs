//! Per-turn store of citation candidates and citation-marker resolution.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One search result that may be cited by the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttribute {
    pub link: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl SourceAttribute {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            index: None,
        }
    }
}

/// Matches `[<index>]: <link>`. The opening bracket is optional because
/// the service sometimes drops it on the first footnote line.
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[?(\d+)\]: (.*)").unwrap());

/// Candidates accumulated over a single turn.
#[derive(Debug, Clone, Default)]
pub struct SourceAttributionAccumulator {
    candidates: Vec<SourceAttribute>,
}

impl SourceAttributionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append candidates in encounter order. No de-duplication.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = SourceAttribute>) {
        self.candidates.extend(candidates);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Resolve citation-marker lines against the stored candidates.
    ///
    /// Each matching line yields a copy of the first candidate with the same
    /// link, annotated with the parsed index, in line order. Markers with
    /// no candidate are dropped; candidates never cited are left out.
    pub fn resolve<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Vec<SourceAttribute> {
        lines
            .into_iter()
            .filter_map(|line| {
                let caps = MARKER_RE.captures(line)?;
                let index: u32 = caps[1].parse().ok()?;
                let link = &caps[2];
                let candidate = self.candidates.iter().find(|c| c.link == link)?;
                Some(SourceAttribute {
                    index: Some(index),
                    ..candidate.clone()
                })
            })
            .collect()
    }
}

/// Render resolved attributes as a JSON array, one compact object per line.
pub(crate) fn render_attributes(attributes: &[SourceAttribute]) -> String {
    let items: Vec<String> = attributes
        .iter()
        .filter_map(|a| serde_json::to_string(a).ok())
        .map(|json| format!("  {json}"))
        .collect();
    format!("[\n{}\n]", items.join(",\n"))
}
