//! Keyboard-driven completion session state machine.
//!
//! `Closed` until the trigger scanner reports an `@query` with at least one
//! candidate. While `Open`, navigation and commit keys are swallowed so the
//! host does not also apply their default text effect.

use serde::Serialize;
use tracing::debug;

use crate::core::filter::filter;
use crate::core::registry::{MentionRegistry, RegistryEntry};
use crate::core::trigger::Trigger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSession {
    pub trigger: Trigger,
    pub candidates: Vec<RegistryEntry>,
    pub active_index: usize,
}

impl CompletionSession {
    pub fn trigger_start(&self) -> usize {
        self.trigger.trigger_start
    }

    pub fn query(&self) -> &str {
        &self.trigger.query
    }

    pub fn active(&self) -> Option<&RegistryEntry> {
        self.candidates.get(self.active_index)
    }

    pub fn offers(&self, entry: &RegistryEntry) -> bool {
        self.candidates
            .iter()
            .any(|candidate| candidate.same_identity(entry))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKey {
    ArrowUp,
    ArrowDown,
    Enter,
    Tab,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Session closed; the host applies the key's default effect.
    PassThrough,
    /// Key consumed by the session.
    Handled,
    /// Key consumed and the session closed with a selection to insert.
    Commit {
        session: CompletionSession,
        entry: RegistryEntry,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompletionState {
    #[default]
    Closed,
    Open(CompletionSession),
}

/// What a host needs to draw the completion popup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopupView {
    pub open: bool,
    pub position: usize,
    pub candidates: Vec<RegistryEntry>,
    pub active_index: usize,
}

impl CompletionState {
    pub fn is_open(&self) -> bool {
        matches!(self, CompletionState::Open(_))
    }

    pub fn session(&self) -> Option<&CompletionSession> {
        match self {
            CompletionState::Open(session) => Some(session),
            CompletionState::Closed => None,
        }
    }

    pub fn close(&mut self) {
        if self.is_open() {
            debug!("completion session closed");
        }
        *self = CompletionState::Closed;
    }

    /// Apply the latest scan result. A new trigger or query starts at the first
    /// candidate; an unchanged one keeps its highlighted entry when still valid.
    pub fn sync(&mut self, trigger: Option<Trigger>, registry: &MentionRegistry) {
        let Some(trigger) = trigger else {
            self.close();
            return;
        };

        let candidates = filter(registry, &trigger.query);
        if candidates.is_empty() {
            self.close();
            return;
        }

        let active_index = match self {
            CompletionState::Open(previous) if previous.trigger == trigger => previous
                .active()
                .and_then(|active| {
                    candidates
                        .iter()
                        .position(|candidate| candidate.same_identity(active))
                })
                .unwrap_or(0),
            _ => {
                debug!(
                    trigger_start = trigger.trigger_start,
                    query = %trigger.query,
                    candidates = candidates.len(),
                    "completion session opened"
                );
                0
            }
        };

        *self = CompletionState::Open(CompletionSession {
            trigger,
            candidates,
            active_index,
        });
    }

    pub fn handle_key(&mut self, key: CompletionKey) -> KeyOutcome {
        let CompletionState::Open(session) = self else {
            return KeyOutcome::PassThrough;
        };
        let len = session.candidates.len();
        if len == 0 {
            self.close();
            return KeyOutcome::Handled;
        }

        match key {
            CompletionKey::ArrowDown => {
                session.active_index = (session.active_index + 1) % len;
                KeyOutcome::Handled
            }
            CompletionKey::ArrowUp => {
                session.active_index = (session.active_index + len - 1) % len;
                KeyOutcome::Handled
            }
            CompletionKey::Enter | CompletionKey::Tab => {
                let index = session.active_index;
                self.take_selection(index)
                    .map_or(KeyOutcome::Handled, |(session, entry)| KeyOutcome::Commit {
                        session,
                        entry,
                    })
            }
            CompletionKey::Escape => {
                self.close();
                KeyOutcome::Handled
            }
        }
    }

    /// Pointer hover highlights a candidate.
    pub fn hover(&mut self, index: usize) -> bool {
        match self {
            CompletionState::Open(session) if index < session.candidates.len() => {
                session.active_index = index;
                true
            }
            _ => false,
        }
    }

    /// Pointer click commits a candidate and closes the session.
    pub fn select(&mut self, index: usize) -> Option<(CompletionSession, RegistryEntry)> {
        let in_range = matches!(
            self,
            CompletionState::Open(session) if index < session.candidates.len()
        );
        if !in_range {
            return None;
        }
        self.take_selection(index)
    }

    pub fn popup(&self) -> PopupView {
        match self {
            CompletionState::Open(session) => PopupView {
                open: true,
                position: session.trigger_start(),
                candidates: session.candidates.clone(),
                active_index: session.active_index,
            },
            CompletionState::Closed => PopupView::default(),
        }
    }

    fn take_selection(&mut self, index: usize) -> Option<(CompletionSession, RegistryEntry)> {
        match std::mem::take(self) {
            CompletionState::Open(session) => {
                let entry = session.candidates.get(index)?.clone();
                Some((session, entry))
            }
            CompletionState::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::RegistryEntry;

    fn registry() -> MentionRegistry {
        MentionRegistry::new(vec![
            RegistryEntry::model("gpt-4", "GPT-4"),
            RegistryEntry::model("gpt-4o", "GPT-4o"),
            RegistryEntry::model("gpt-3", "GPT-3"),
            RegistryEntry::tool("web", "Web"),
        ])
        .expect("registry")
    }

    fn trigger(start: usize, query: &str) -> Trigger {
        Trigger {
            trigger_start: start,
            query: query.to_string(),
            marker: '@',
        }
    }

    fn open_on(query: &str) -> CompletionState {
        let mut state = CompletionState::default();
        state.sync(Some(trigger(0, query)), &registry());
        state
    }

    fn active_index(state: &CompletionState) -> usize {
        state.session().expect("open session").active_index
    }

    #[test]
    fn closed_passes_keys_through() {
        let mut state = CompletionState::default();
        for key in [
            CompletionKey::ArrowUp,
            CompletionKey::ArrowDown,
            CompletionKey::Enter,
            CompletionKey::Tab,
            CompletionKey::Escape,
        ] {
            assert_eq!(state.handle_key(key), KeyOutcome::PassThrough);
        }
    }

    #[test]
    fn arrows_wrap_around() {
        let mut state = open_on("gpt");
        assert_eq!(state.session().map(|s| s.candidates.len()), Some(3));

        state.hover(2);
        assert_eq!(state.handle_key(CompletionKey::ArrowDown), KeyOutcome::Handled);
        assert_eq!(active_index(&state), 0);
        assert_eq!(state.handle_key(CompletionKey::ArrowUp), KeyOutcome::Handled);
        assert_eq!(active_index(&state), 2);
    }

    #[test]
    fn enter_commits_active_candidate_and_closes() {
        let mut state = open_on("gpt");
        state.handle_key(CompletionKey::ArrowDown);
        match state.handle_key(CompletionKey::Enter) {
            KeyOutcome::Commit { session, entry } => {
                assert_eq!(entry.id, "gpt-4o");
                assert_eq!(session.query(), "gpt");
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(!state.is_open());
    }

    #[test]
    fn tab_commits_like_enter() {
        let mut state = open_on("web");
        assert!(matches!(
            state.handle_key(CompletionKey::Tab),
            KeyOutcome::Commit { ref entry, .. } if entry.id == "web"
        ));
    }

    #[test]
    fn escape_closes_without_commit() {
        let mut state = open_on("gpt");
        assert_eq!(state.handle_key(CompletionKey::Escape), KeyOutcome::Handled);
        assert_eq!(state, CompletionState::Closed);
    }

    #[test]
    fn empty_candidates_or_lost_trigger_close() {
        let mut state = open_on("gpt");
        state.sync(Some(trigger(0, "nothing-matches")), &registry());
        assert!(!state.is_open());

        let mut state = open_on("gpt");
        state.sync(None, &registry());
        assert!(!state.is_open());
    }

    #[test]
    fn query_change_resets_active_index() {
        let mut state = open_on("gpt");
        state.handle_key(CompletionKey::ArrowDown);
        state.sync(Some(trigger(0, "gpt-")), &registry());
        assert_eq!(active_index(&state), 0);
    }

    #[test]
    fn unchanged_trigger_keeps_highlight() {
        let mut state = open_on("gpt");
        state.handle_key(CompletionKey::ArrowDown);
        state.sync(Some(trigger(0, "gpt")), &registry());
        assert_eq!(active_index(&state), 1);
    }

    #[test]
    fn hover_ignores_out_of_range() {
        let mut state = open_on("gpt");
        assert!(!state.hover(7));
        assert!(state.hover(1));
        assert_eq!(active_index(&state), 1);
    }

    #[test]
    fn select_commits_clicked_candidate() {
        let mut state = open_on("gpt");
        let (_, entry) = state.select(2).expect("selection");
        assert_eq!(entry.id, "gpt-3");
        assert!(!state.is_open());
        assert!(state.select(0).is_none());
    }

    #[test]
    fn popup_reflects_session() {
        let state = open_on("web");
        let popup = state.popup();
        assert!(popup.open);
        assert_eq!(popup.position, 0);
        assert_eq!(popup.candidates.len(), 1);
        assert_eq!(CompletionState::Closed.popup(), PopupView::default());
    }

    #[test]
    fn session_without_candidates_closes_on_any_key() {
        for key in [
            CompletionKey::ArrowUp,
            CompletionKey::ArrowDown,
            CompletionKey::Enter,
            CompletionKey::Tab,
            CompletionKey::Escape,
        ] {
            let mut state = CompletionState::Open(CompletionSession {
                trigger: trigger(0, "x"),
                candidates: Vec::new(),
                active_index: 0,
            });
            assert_eq!(state.handle_key(key), KeyOutcome::Handled);
            assert_eq!(state, CompletionState::Closed);
        }
    }
}
