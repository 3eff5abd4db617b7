//! Atomic replacement of an `@query` span with a mention chip.

use tracing::debug;

use crate::core::completion::CompletionSession;
use crate::core::document::{Document, MentionChip, Segment};
use crate::core::error::{EditorError, StaleReason};
use crate::core::registry::{KindDefaults, RegistryEntry};

/// Separator written after every inserted chip so typed text never touches it.
pub const MENTION_SEPARATOR: char = '\u{00A0}';

/// Replace the session's trigger span with a chip for `entry` plus one
/// [`MENTION_SEPARATOR`]. Returns the new document and the caret after the
/// separator. On error `document` is untouched, including when the chip's
/// token would not survive a save and reload.
pub fn insert_mention(
    document: &Document,
    session: &CompletionSession,
    entry: &RegistryEntry,
    defaults: &KindDefaults,
) -> Result<(Document, usize), EditorError> {
    if !session.offers(entry) {
        return Err(stale(StaleReason::EntryNotOffered));
    }
    if entry.label.is_empty() || entry.label.contains([']', '\n']) {
        return Err(EditorError::UnrepresentableLabel {
            label: entry.label.clone(),
        });
    }

    let trigger = &session.trigger;
    let end = trigger.end();
    let (run_start, before) = document
        .text_run_before(end)
        .ok_or_else(|| stale(StaleReason::TriggerSpanChanged))?;
    if run_start > trigger.trigger_start
        || before.chars().skip(trigger.trigger_start - run_start).collect::<String>()
            != trigger.span_text()
    {
        return Err(stale(StaleReason::TriggerSpanChanged));
    }

    let chip = MentionChip::from_entry(entry, defaults);
    let caret = trigger.trigger_start + chip.width() + 1;
    let mut updated = document.clone();
    updated.splice(
        trigger.trigger_start..end,
        vec![
            Segment::Mention(chip),
            Segment::text(MENTION_SEPARATOR.to_string()),
        ],
    );
    if !updated.is_canonical() {
        debug!(id = %entry.id, "mention would merge with preceding text");
        return Err(EditorError::AbsorbedByPrefix {
            label: entry.label.clone(),
        });
    }
    debug!(id = %entry.id, kind = %entry.kind, caret, "mention inserted");
    Ok((updated, caret))
}

fn stale(reason: StaleReason) -> EditorError {
    debug!(%reason, "rejected stale completion commit");
    EditorError::StaleCompletionSession { reason }
}
