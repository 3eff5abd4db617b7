//! Detection of an in-progress `@query` immediately before the caret.

use serde::Serialize;

use crate::core::document::Document;

pub const DEFAULT_TRIGGER: char = '@';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trigger {
    pub trigger_start: usize,
    pub query: String,
    #[serde(skip)]
    pub marker: char,
}

impl Trigger {
    /// Offset just past the query; equals the caret the trigger was scanned at.
    pub fn end(&self) -> usize {
        self.trigger_start + 1 + self.query.chars().count()
    }

    /// Literal text the trigger span holds in the document.
    pub fn span_text(&self) -> String {
        let mut text = String::with_capacity(self.query.len() + self.marker.len_utf8());
        text.push(self.marker);
        text.push_str(&self.query);
        text
    }
}

pub fn scan(document: &Document, caret: usize) -> Option<Trigger> {
    scan_with_marker(document, caret, DEFAULT_TRIGGER)
}

/// Walk back from the caret inside its text run. The nearest marker wins,
/// whitespace or the run boundary ends the search.
pub fn scan_with_marker(document: &Document, caret: usize, marker: char) -> Option<Trigger> {
    let caret = document.snap_caret(caret);
    let (run_start, before) = document.text_run_before(caret)?;
    let before_len = before.chars().count();

    for (back, (byte_idx, ch)) in before.char_indices().rev().enumerate() {
        if ch == marker {
            let query = &before[byte_idx + ch.len_utf8()..];
            return Some(Trigger {
                trigger_start: run_start + before_len - back - 1,
                query: query.to_string(),
                marker,
            });
        }
        if ch.is_whitespace() {
            return None;
        }
    }
    None
}
