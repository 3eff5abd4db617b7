//! Conversion between the portable `[Kind:Label]` text form and [`Document`].
//!
//! Parsing never fails. Unknown labels become best-effort chips and anything
//! that only looks like a token (`[Model:` with no `]`, `[Model:]`, `[model:x]`)
//! stays literal text.

use memchr::{memchr, memchr2, memchr2_iter};

use crate::core::document::{literal_segments, Document, MentionChip, Segment};
use crate::core::registry::{KindDefaults, MentionKind, MentionRegistry};

pub fn parse(text: &str, registry: &MentionRegistry) -> Document {
    parse_with_defaults(text, registry, &KindDefaults::default())
}

pub fn parse_with_defaults(
    text: &str,
    registry: &MentionRegistry,
    defaults: &KindDefaults,
) -> Document {
    Document::from_segments(parse_segments(text, registry, defaults))
}

pub fn serialize(document: &Document) -> String {
    let mut out = String::with_capacity(document.len());
    for segment in document.segments() {
        match segment {
            Segment::Text { value } => out.push_str(value),
            Segment::Mention(chip) => {
                out.push('[');
                out.push_str(chip.kind.token_name());
                out.push(':');
                out.push_str(&chip.label);
                out.push(']');
            }
            Segment::LineBreak => out.push('\n'),
        }
    }
    out
}

/// Un-normalized segments for `text`; callers merge runs.
pub(crate) fn parse_segments(
    text: &str,
    registry: &MentionRegistry,
    defaults: &KindDefaults,
) -> Vec<Segment> {
    let bytes = text.as_bytes();
    let mut closes = CloseFinder::new(bytes);
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut skip_until = 0;

    for idx in memchr2_iter(b'[', b'\n', bytes) {
        if idx < skip_until {
            continue;
        }
        if bytes[idx] == b'\n' {
            push_literal(&mut segments, &text[literal_start..idx]);
            segments.push(Segment::LineBreak);
            literal_start = idx + 1;
            continue;
        }
        if let Some(token) = match_token(text, idx, &mut closes) {
            push_literal(&mut segments, &text[literal_start..idx]);
            segments.push(Segment::Mention(MentionChip::resolve(
                token.kind, token.label, registry, defaults,
            )));
            literal_start = token.end;
            skip_until = literal_start;
        }
    }
    push_literal(&mut segments, &text[literal_start..]);
    segments
}

/// Longest kind name (`Model`).
const KIND_NAME_MAX: usize = 5;

struct Token<'a> {
    kind: MentionKind,
    label: &'a str,
    /// Byte offset just past the closing `]`.
    end: usize,
}

/// Remembers the last `]` or `\n` found so a scan over many unclosed `[`
/// stays linear.
struct CloseFinder<'a> {
    bytes: &'a [u8],
    searched_from: usize,
    found: Option<usize>,
}

impl<'a> CloseFinder<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            searched_from: usize::MAX,
            found: None,
        }
    }

    /// First `]` or `\n` at or after `from`.
    fn next_from(&mut self, from: usize) -> Option<usize> {
        if from >= self.searched_from {
            match self.found {
                None => return None,
                Some(found) if found >= from => return Some(found),
                Some(_) => {}
            }
        }
        let found = memchr2(b']', b'\n', self.bytes.get(from..)?).map(|pos| from + pos);
        self.searched_from = from;
        self.found = found;
        found
    }
}

/// Match `[Kind:Label]` at byte `idx` of `text`. The label is the shortest
/// non-empty run up to the first `]` and may not cross a newline.
fn match_token<'a>(text: &'a str, idx: usize, closes: &mut CloseFinder<'_>) -> Option<Token<'a>> {
    let rest = text[idx..].strip_prefix('[')?;
    let head = &rest.as_bytes()[..rest.len().min(KIND_NAME_MAX + 1)];
    let colon = memchr(b':', head)?;
    let kind = MentionKind::from_token_name(&rest[..colon])?;
    let label_start = idx + 1 + colon + 1;
    let close = closes.next_from(label_start)?;
    if close == label_start || text.as_bytes()[close] != b']' {
        return None;
    }
    Some(Token {
        kind,
        label: &text[label_start..close],
        end: close + 1,
    })
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.extend(literal_segments(text));
    }
}
