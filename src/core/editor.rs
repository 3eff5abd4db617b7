//! One editing session over a prompt document.
//!
//! Events are applied strictly in arrival order. Each one runs its full
//! pipeline before returning: document edit, token promotion, trigger scan,
//! completion update, serialization.

use tracing::debug;

use crate::core::completion::{
    CompletionKey, CompletionSession, CompletionState, KeyOutcome, PopupView,
};
use crate::core::document::Document;
use crate::core::error::{EditorError, StaleReason};
use crate::core::insertion::insert_mention;
use crate::core::registry::{KindDefaults, MentionRegistry, RegistryEntry};
use crate::core::serializer::{parse_with_defaults, serialize};
use crate::core::trigger::{scan_with_marker, DEFAULT_TRIGGER};
use crate::utils::input::sanitize_text_input;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub trigger: char,
    pub defaults: KindDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER,
            defaults: KindDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Insert(char),
    Paste(String),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    SetCaret(usize),
    Key(CompletionKey),
    HoverCandidate(usize),
    SelectCandidate(usize),
    Clear,
    SetText(String),
    ReplaceRegistry(MentionRegistry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorUpdate {
    /// False when a completion key arrived with no open session; the host
    /// applies the key's usual meaning.
    pub consumed: bool,
    /// New serialized text, present only when the document changed.
    pub serialized: Option<String>,
    pub popup: PopupView,
    pub error: Option<EditorError>,
}

#[derive(Debug, Clone)]
pub struct MentionEditor {
    document: Document,
    caret: usize,
    registry: MentionRegistry,
    completion: CompletionState,
    config: EditorConfig,
}

impl MentionEditor {
    pub fn new(initial: &str, registry: MentionRegistry, config: EditorConfig) -> Self {
        let document = parse_with_defaults(initial, &registry, &config.defaults);
        let caret = document.len();
        let mut editor = Self {
            document,
            caret,
            registry,
            completion: CompletionState::Closed,
            config,
        };
        editor.rescan();
        editor
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn registry(&self) -> &MentionRegistry {
        &self.registry
    }

    pub fn completion(&self) -> &CompletionState {
        &self.completion
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn serialized(&self) -> String {
        serialize(&self.document)
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    pub fn popup(&self) -> PopupView {
        self.completion.popup()
    }

    pub fn handle(&mut self, event: EditorEvent) -> EditorUpdate {
        let changed = match event {
            EditorEvent::Key(key) => {
                return match self.completion.handle_key(key) {
                    KeyOutcome::PassThrough => self.update(false, false, None),
                    KeyOutcome::Handled => self.update(true, false, None),
                    KeyOutcome::Commit { session, entry } => self.commit(session, entry),
                };
            }
            EditorEvent::HoverCandidate(index) => {
                let consumed = self.completion.hover(index);
                return self.update(consumed, false, None);
            }
            EditorEvent::SelectCandidate(index) => {
                return match self.completion.select(index) {
                    Some((session, entry)) => self.commit(session, entry),
                    None => self.update(false, false, None),
                };
            }
            EditorEvent::Insert(c) => {
                let mut buf = [0u8; 4];
                self.insert_literal(c.encode_utf8(&mut buf))
            }
            EditorEvent::Paste(text) => self.insert_literal(&sanitize_text_input(&text)),
            EditorEvent::Backspace => {
                let len = self.document.len();
                self.caret = self.document.delete_backward(self.caret);
                self.document.len() != len
            }
            EditorEvent::Delete => {
                let len = self.document.len();
                self.caret = self.document.delete_forward(self.caret);
                self.document.len() != len
            }
            EditorEvent::MoveLeft => {
                self.caret = self.document.move_left(self.caret);
                false
            }
            EditorEvent::MoveRight => {
                self.caret = self.document.move_right(self.caret);
                false
            }
            EditorEvent::MoveStart => {
                self.caret = 0;
                false
            }
            EditorEvent::MoveEnd => {
                self.caret = self.document.len();
                false
            }
            EditorEvent::SetCaret(offset) => {
                self.caret = self.document.snap_caret(offset);
                false
            }
            EditorEvent::Clear => {
                let was_empty = self.document.is_empty();
                self.document.clear();
                self.caret = 0;
                !was_empty
            }
            EditorEvent::SetText(text) => {
                let document = parse_with_defaults(&text, &self.registry, &self.config.defaults);
                let changed = document != self.document;
                self.document = document;
                self.caret = self.document.len();
                changed
            }
            EditorEvent::ReplaceRegistry(registry) => {
                if self.registry.same_snapshot(&registry) {
                    return self.update(true, false, None);
                }
                debug!(entries = registry.len(), "mention registry replaced");
                self.registry = registry;
                false
            }
        };

        if changed
            && self
                .document
                .reparse_text_runs(&self.registry, &self.config.defaults)
        {
            self.caret = self.document.snap_caret(self.caret);
        }
        self.rescan();
        self.update(true, changed, None)
    }

    fn insert_literal(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        self.caret = self.document.insert_text(self.caret, text);
        true
    }

    fn commit(&mut self, session: CompletionSession, entry: RegistryEntry) -> EditorUpdate {
        let result = if self.registry.contains(&entry) {
            insert_mention(&self.document, &session, &entry, &self.config.defaults)
        } else {
            Err(EditorError::StaleCompletionSession {
                reason: StaleReason::EntryNotInRegistry,
            })
        };

        match result {
            Ok((document, caret)) => {
                self.document = document;
                self.caret = caret;
                self.rescan();
                self.update(true, true, None)
            }
            Err(err) => {
                debug!(error = %err, "mention commit rejected");
                self.update(true, false, Some(err))
            }
        }
    }

    fn rescan(&mut self) {
        let trigger = scan_with_marker(&self.document, self.caret, self.config.trigger);
        self.completion.sync(trigger, &self.registry);
    }

    fn update(&self, consumed: bool, changed: bool, error: Option<EditorError>) -> EditorUpdate {
        EditorUpdate {
            consumed,
            serialized: changed.then(|| self.serialized()),
            popup: self.popup(),
            error,
        }
    }
}
