//! Errors reported by editing operations.

use std::fmt;

/// Why a commit no longer matches the document or registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The entry is not among the session's candidates.
    EntryNotOffered,
    /// The registry snapshot no longer holds the entry.
    EntryNotInRegistry,
    /// The document no longer holds `@query` at the session's span.
    TriggerSpanChanged,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::EntryNotOffered => f.write_str("entry is not an offered candidate"),
            StaleReason::EntryNotInRegistry => f.write_str("entry is no longer in the registry"),
            StaleReason::TriggerSpanChanged => f.write_str("trigger text changed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Commit against a session that no longer matches; nothing was changed.
    StaleCompletionSession { reason: StaleReason },
    /// The label cannot be written as a `[Kind:Label]` token.
    UnrepresentableLabel { label: String },
    /// An unclosed `[Kind:` before the trigger would swallow the chip's token.
    AbsorbedByPrefix { label: String },
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::StaleCompletionSession { reason } => {
                write!(f, "Stale completion session: {reason}")
            }
            EditorError::UnrepresentableLabel { label } => {
                write!(f, "Mention label cannot be serialized: {label:?}")
            }
            EditorError::AbsorbedByPrefix { label } => {
                write!(f, "Mention {label:?} would merge with an unclosed bracket before it")
            }
        }
    }
}

impl std::error::Error for EditorError {}
