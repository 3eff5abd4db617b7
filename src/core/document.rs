//! Structured prompt document: text runs, mention chips and line breaks.
//!
//! Offsets are measured in chars of the serialized form. A chip occupies the
//! width of its `[Kind:Label]` token, so promoting literal token text into a
//! chip never shifts a caret. A valid caret is never strictly inside a chip.

use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

use crate::core::registry::{KindDefaults, MentionKind, MentionRegistry, RegistryEntry};
use crate::core::serializer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionChip {
    pub id: String,
    pub label: String,
    pub kind: MentionKind,
    pub icon: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl MentionChip {
    pub fn from_entry(entry: &RegistryEntry, defaults: &KindDefaults) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.label.clone(),
            kind: entry.kind,
            icon: entry
                .icon
                .clone()
                .unwrap_or_else(|| defaults.icon(entry.kind).to_string()),
            color: entry
                .color
                .clone()
                .unwrap_or_else(|| defaults.color(entry.kind).to_string()),
            logo: entry.logo.clone(),
        }
    }

    /// Chip for a label the registry does not know; the label doubles as id.
    pub fn unresolved(kind: MentionKind, label: &str, defaults: &KindDefaults) -> Self {
        Self {
            id: label.to_string(),
            label: label.to_string(),
            kind,
            icon: defaults.icon(kind).to_string(),
            color: defaults.color(kind).to_string(),
            logo: None,
        }
    }

    pub fn resolve(
        kind: MentionKind,
        label: &str,
        registry: &MentionRegistry,
        defaults: &KindDefaults,
    ) -> Self {
        match registry.find_label(kind, label) {
            Some(entry) => Self::from_entry(entry, defaults),
            None => Self::unresolved(kind, label, defaults),
        }
    }

    pub fn token(&self) -> String {
        format!("[{}:{}]", self.kind.token_name(), self.label)
    }

    pub fn width(&self) -> usize {
        self.kind.token_name().chars().count() + self.label.chars().count() + 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { value: String },
    Mention(MentionChip),
    LineBreak,
}

impl Segment {
    pub fn text(value: impl Into<String>) -> Self {
        Segment::Text {
            value: value.into(),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Segment::Text { value } => value.chars().count(),
            Segment::Mention(chip) => chip.width(),
            Segment::LineBreak => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    segments: Vec<Segment>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut document = Self { segments };
        document.normalize();
        document
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn mentions(&self) -> impl Iterator<Item = &MentionChip> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Mention(chip) => Some(chip),
            _ => None,
        })
    }

    /// Clamp to the document and move offsets that land inside a chip to its end.
    pub fn snap_caret(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        match self.chip_containing(offset) {
            Some(span) => span.end,
            None => offset,
        }
    }

    /// Span of the chip that strictly contains `offset`, if any.
    fn chip_containing(&self, offset: usize) -> Option<Range<usize>> {
        let mut pos = 0;
        for segment in &self.segments {
            let width = segment.width();
            if offset < pos + width {
                if offset > pos && matches!(segment, Segment::Mention(_)) {
                    return Some(pos..pos + width);
                }
                return None;
            }
            pos += width;
        }
        None
    }

    /// Replace the logical range with `replacement`. Range ends are snapped
    /// first, so a chip is either kept whole or removed whole.
    pub fn splice(&mut self, range: Range<usize>, replacement: Vec<Segment>) {
        let start = self.snap_caret(range.start);
        let end = self.snap_caret(range.end).max(start);
        let (mut segments, _) = self.split_at(start);
        let (_, tail) = self.split_at(end);
        segments.extend(replacement);
        segments.extend(tail);
        self.segments = segments;
        self.normalize();
    }

    /// Insert literal text at the caret and return the caret after it.
    pub fn insert_text(&mut self, offset: usize, text: &str) -> usize {
        let caret = self.snap_caret(offset);
        if text.is_empty() {
            return caret;
        }
        self.splice(caret..caret, literal_segments(text));
        caret + text.chars().count()
    }

    pub fn delete_backward(&mut self, caret: usize) -> usize {
        let caret = self.snap_caret(caret);
        match self.unit_before(caret) {
            Some(range) => {
                let start = range.start;
                self.splice(range, Vec::new());
                start
            }
            None => caret,
        }
    }

    pub fn delete_forward(&mut self, caret: usize) -> usize {
        let caret = self.snap_caret(caret);
        if let Some(range) = self.unit_after(caret) {
            self.splice(range, Vec::new());
        }
        caret
    }

    pub fn move_left(&self, caret: usize) -> usize {
        let caret = self.snap_caret(caret);
        self.unit_before(caret).map_or(caret, |range| range.start)
    }

    pub fn move_right(&self, caret: usize) -> usize {
        let caret = self.snap_caret(caret);
        self.unit_after(caret).map_or(caret, |range| range.end)
    }

    /// The text run the caret sits in or at the end of, as
    /// `(run start offset, run text before the caret)`.
    pub fn text_run_before(&self, caret: usize) -> Option<(usize, &str)> {
        let mut pos = 0;
        for segment in &self.segments {
            let width = segment.width();
            if caret > pos && caret <= pos + width {
                return match segment {
                    Segment::Text { value } => {
                        let end = char_to_byte_index(value, caret - pos);
                        Some((pos, &value[..end]))
                    }
                    _ => None,
                };
            }
            pos += width;
        }
        None
    }

    /// Whether the serialized form parses back to the same segments. Chip
    /// resolution is ignored; only kinds, labels, text and line breaks count.
    pub fn is_canonical(&self) -> bool {
        let reparsed = serializer::parse_segments(
            &serializer::serialize(self),
            &MentionRegistry::empty(),
            &KindDefaults::default(),
        );
        same_shape(&self.segments, &Document::from_segments(reparsed).segments)
    }

    /// Rebuild the document from its own serialized text. Patterns that edits
    /// formed inside text runs become chips, and a chip that now closes an
    /// unterminated `[Kind:` before it turns into the token the text spells.
    /// Chips that keep their span keep their resolution. Returns `false` and
    /// leaves the document untouched when it is already canonical.
    pub fn reparse_text_runs(
        &mut self,
        registry: &MentionRegistry,
        defaults: &KindDefaults,
    ) -> bool {
        let mut reparsed = Document::from_segments(serializer::parse_segments(
            &serializer::serialize(self),
            registry,
            defaults,
        ));
        if same_shape(&self.segments, &reparsed.segments) {
            return false;
        }

        let mut previous = HashMap::new();
        let mut pos = 0;
        for segment in self.segments.drain(..) {
            let width = segment.width();
            if let Segment::Mention(chip) = segment {
                previous.insert(pos, chip);
            }
            pos += width;
        }
        let mut pos = 0;
        for segment in &mut reparsed.segments {
            let width = segment.width();
            if let Segment::Mention(chip) = segment {
                match previous.remove(&pos) {
                    Some(old) if old.kind == chip.kind && old.label == chip.label => *chip = old,
                    _ => {}
                }
            }
            pos += width;
        }

        self.segments = reparsed.segments;
        tracing::debug!(
            mentions = self.mentions().count(),
            "reparsed document from its serialized text"
        );
        true
    }

    /// Range of the editing unit ending at the caret: one char, one line
    /// break, or a whole chip.
    fn unit_before(&self, caret: usize) -> Option<Range<usize>> {
        if caret == 0 {
            return None;
        }
        let mut pos = 0;
        for segment in &self.segments {
            let width = segment.width();
            if caret <= pos + width {
                return Some(match segment {
                    Segment::Mention(_) => pos..pos + width,
                    _ => caret - 1..caret,
                });
            }
            pos += width;
        }
        None
    }

    fn unit_after(&self, caret: usize) -> Option<Range<usize>> {
        let mut pos = 0;
        for segment in &self.segments {
            let width = segment.width();
            if caret < pos + width {
                return Some(match segment {
                    Segment::Mention(_) => pos..pos + width,
                    _ => caret..caret + 1,
                });
            }
            pos += width;
        }
        None
    }

    /// Split into owned halves at a snapped offset; a text run straddling the
    /// offset is cut in two.
    fn split_at(&self, offset: usize) -> (Vec<Segment>, Vec<Segment>) {
        let mut head = Vec::new();
        let mut tail = Vec::new();
        let mut pos = 0;
        for segment in &self.segments {
            let width = segment.width();
            if pos + width <= offset {
                head.push(segment.clone());
            } else if pos >= offset {
                tail.push(segment.clone());
            } else {
                match segment {
                    Segment::Text { value } => {
                        let byte_idx = char_to_byte_index(value, offset - pos);
                        head.push(Segment::text(&value[..byte_idx]));
                        tail.push(Segment::text(&value[byte_idx..]));
                    }
                    other => head.push(other.clone()),
                }
            }
            pos += width;
        }
        (head, tail)
    }

    fn normalize(&mut self) {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            match segment {
                Segment::Text { value } if value.is_empty() => {}
                Segment::Text { value } => {
                    if let Some(Segment::Text { value: previous }) = merged.last_mut() {
                        previous.push_str(&value);
                    } else {
                        merged.push(Segment::Text { value });
                    }
                }
                other => merged.push(other),
            }
        }
        self.segments = merged;
    }
}

fn same_shape(left: &[Segment], right: &[Segment]) -> bool {
    left.len() == right.len()
        && left.iter().zip(right).all(|pair| match pair {
            (Segment::Mention(a), Segment::Mention(b)) => a.kind == b.kind && a.label == b.label,
            (a, b) => a == b,
        })
}

/// Text and line-break segments for literal input, without token parsing.
pub(crate) fn literal_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for (idx, line) in text.split('\n').enumerate() {
        if idx > 0 {
            segments.push(Segment::LineBreak);
        }
        if !line.is_empty() {
            segments.push(Segment::text(line));
        }
    }
    segments
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }
    input
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}
