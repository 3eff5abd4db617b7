//! Interactive prompt composer drawn in an inline terminal viewport.
//!
//! The composer is a thin host around [`MentionEditor`]: crossterm keys are
//! mapped to editor events, and keys the completion session does not consume
//! fall back to their composer meaning (Enter submits, Esc cancels).

use std::error::Error;
use std::io;

use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use tracing::{debug, warn};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::completion::{CompletionKey, PopupView};
use crate::core::config::Config;
use crate::core::document::{Document, MentionChip, Segment};
use crate::core::editor::{EditorEvent, MentionEditor};
use crate::core::registry::{KindDefaults, MentionRegistry, RegistryEntry};
use crate::ui::theme::{active_candidate_style, chip_style, error_style, hint_style};

/// Rows reserved for the prompt text.
pub const INPUT_ROWS: u16 = 4;

const HINT_EDITING: &str = "Enter submit · Alt+Enter newline · Esc cancel";
const HINT_COMPLETING: &str = "↑/↓ select · Enter/Tab insert · Esc close";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerOutcome {
    Submitted(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerAction {
    Edit(EditorEvent),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerStep {
    Continue,
    Finish(ComposerOutcome),
}

pub fn map_key_event_to_action(key: &KeyEvent) -> Option<ComposerAction> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let event = match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => EditorEvent::Insert('\n'),
        KeyCode::Enter => EditorEvent::Key(CompletionKey::Enter),
        KeyCode::Tab => EditorEvent::Key(CompletionKey::Tab),
        KeyCode::Esc => EditorEvent::Key(CompletionKey::Escape),
        KeyCode::Up => EditorEvent::Key(CompletionKey::ArrowUp),
        KeyCode::Down => EditorEvent::Key(CompletionKey::ArrowDown),
        KeyCode::Backspace => EditorEvent::Backspace,
        KeyCode::Delete => EditorEvent::Delete,
        KeyCode::Left => EditorEvent::MoveLeft,
        KeyCode::Right => EditorEvent::MoveRight,
        KeyCode::Home => EditorEvent::MoveStart,
        KeyCode::End => EditorEvent::MoveEnd,
        KeyCode::Char('c') if control => return Some(ComposerAction::Cancel),
        KeyCode::Char('a') if control => EditorEvent::MoveStart,
        KeyCode::Char('e') if control => EditorEvent::MoveEnd,
        KeyCode::Char('j') if control => EditorEvent::Insert('\n'),
        KeyCode::Char('u') if control => EditorEvent::Clear,
        KeyCode::Char(c) if !control => EditorEvent::Insert(c),
        _ => return None,
    };
    Some(ComposerAction::Edit(event))
}

pub struct Composer {
    editor: MentionEditor,
    popup_rows: usize,
    status: Option<String>,
}

impl Composer {
    pub fn new(editor: MentionEditor, popup_rows: usize) -> Self {
        Self {
            editor,
            popup_rows: popup_rows.max(1),
            status: None,
        }
    }

    pub fn editor(&self) -> &MentionEditor {
        &self.editor
    }

    pub fn viewport_height(&self) -> u16 {
        let popup = u16::try_from(self.popup_rows).unwrap_or(u16::MAX);
        INPUT_ROWS.saturating_add(1).saturating_add(popup)
    }

    pub fn handle_action(&mut self, action: ComposerAction) -> ComposerStep {
        let event = match action {
            ComposerAction::Cancel => return ComposerStep::Finish(ComposerOutcome::Cancelled),
            ComposerAction::Edit(event) => event,
        };
        let fallback = match &event {
            EditorEvent::Key(key) => Some(*key),
            _ => None,
        };

        let update = self.editor.handle(event);
        if let Some(err) = update.error {
            warn!(error = %err, "mention not inserted");
            self.status = Some(err.to_string());
        } else if update.serialized.is_some() {
            self.status = None;
        }
        if update.consumed {
            return ComposerStep::Continue;
        }

        match fallback {
            Some(CompletionKey::Enter) if !self.editor.is_empty() => {
                let text = self.editor.serialized();
                debug!(chars = text.chars().count(), "prompt submitted");
                ComposerStep::Finish(ComposerOutcome::Submitted(text))
            }
            Some(CompletionKey::Escape) => ComposerStep::Finish(ComposerOutcome::Cancelled),
            Some(CompletionKey::Tab) => {
                self.editor.handle(EditorEvent::Paste("\t".to_string()));
                ComposerStep::Continue
            }
            _ => ComposerStep::Continue,
        }
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(INPUT_ROWS),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(f.area());

        let document = self.editor.document();
        let (row, col) = caret_position(document, self.editor.caret());
        let scroll_y = row.saturating_sub(INPUT_ROWS.saturating_sub(1));
        let scroll_x = col.saturating_sub(chunks[0].width.saturating_sub(1));

        let input = if document.is_empty() {
            let text = placeholder(self.editor.config().trigger);
            Paragraph::new(Line::from(Span::styled(text, hint_style())))
        } else {
            Paragraph::new(document_lines(document)).scroll((scroll_y, scroll_x))
        };
        f.render_widget(input, chunks[0]);

        let popup = self.editor.popup();
        let hint = match &self.status {
            Some(message) => Span::styled(format!("⚠ {message}"), error_style()),
            None if popup.open => Span::styled(HINT_COMPLETING, hint_style()),
            None => Span::styled(HINT_EDITING, hint_style()),
        };
        f.render_widget(Paragraph::new(Line::from(hint)), chunks[1]);

        if popup.open {
            let lines = popup_lines(&popup, &self.editor.config().defaults, self.popup_rows);
            f.render_widget(Paragraph::new(lines), chunks[2]);
        }

        f.set_cursor_position((
            chunks[0].x + col.saturating_sub(scroll_x),
            chunks[0].y + row.saturating_sub(scroll_y),
        ));
    }
}

pub fn run_composer(
    initial: &str,
    registry: MentionRegistry,
    config: &Config,
) -> Result<ComposerOutcome, Box<dyn Error>> {
    let editor = MentionEditor::new(initial, registry, config.editor_config());
    let mut composer = Composer::new(editor, config.popup_rows());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableBracketedPaste).inspect_err(|_| {
        let _ = disable_raw_mode();
    })?;

    let result = (|| -> Result<ComposerOutcome, Box<dyn Error>> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(composer.viewport_height()),
            },
        )?;
        let outcome = event_loop(&mut terminal, &mut composer);
        terminal.clear()?;
        outcome
    })();

    let disable_raw_result = disable_raw_mode();
    let disable_paste_result = execute!(stdout, DisableBracketedPaste);

    let outcome = result?;
    disable_raw_result?;
    disable_paste_result?;
    Ok(outcome)
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    composer: &mut Composer,
) -> Result<ComposerOutcome, Box<dyn Error>> {
    loop {
        terminal.draw(|f| composer.render(f))?;

        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => map_key_event_to_action(&key),
            Event::Paste(text) => Some(ComposerAction::Edit(EditorEvent::Paste(text))),
            _ => None,
        };
        if let Some(action) = action {
            if let ComposerStep::Finish(outcome) = composer.handle_action(action) {
                return Ok(outcome);
            }
        }
    }
}

fn placeholder(trigger: char) -> String {
    format!("Type {trigger} to mention a model or tool")
}

fn chip_text(chip: &MentionChip) -> String {
    format!("{} {}", chip.icon, chip.label)
}

/// Render segments as terminal lines, one per line break.
pub fn document_lines(document: &Document) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut spans = Vec::new();
    for segment in document.segments() {
        match segment {
            Segment::Text { value } => spans.push(Span::raw(value.clone())),
            Segment::Mention(chip) => {
                spans.push(Span::styled(chip_text(chip), chip_style(&chip.color)))
            }
            Segment::LineBreak => lines.push(Line::from(std::mem::take(&mut spans))),
        }
    }
    lines.push(Line::from(spans));
    lines
}

/// Display (row, column) of a caret offset, using rendered chip widths.
pub fn caret_position(document: &Document, caret: usize) -> (u16, u16) {
    let mut offset = 0;
    let mut row = 0usize;
    let mut col = 0usize;

    'segments: for segment in document.segments() {
        if offset >= caret {
            break;
        }
        match segment {
            Segment::Text { value } => {
                for ch in value.chars() {
                    if offset >= caret {
                        break 'segments;
                    }
                    col += ch.width().unwrap_or(0);
                    offset += 1;
                }
            }
            Segment::Mention(chip) => {
                col += UnicodeWidthStr::width(chip_text(chip).as_str());
                offset += chip.width();
            }
            Segment::LineBreak => {
                row += 1;
                col = 0;
                offset += 1;
            }
        }
    }

    (
        u16::try_from(row).unwrap_or(u16::MAX),
        u16::try_from(col).unwrap_or(u16::MAX),
    )
}

/// Candidate rows, windowed so the active entry stays visible.
pub fn popup_lines(
    popup: &PopupView,
    defaults: &KindDefaults,
    max_rows: usize,
) -> Vec<Line<'static>> {
    let max_rows = max_rows.max(1);
    let start = (popup.active_index + 1).saturating_sub(max_rows);
    popup
        .candidates
        .iter()
        .enumerate()
        .skip(start)
        .take(max_rows)
        .map(|(index, entry)| candidate_line(entry, defaults, index == popup.active_index))
        .collect()
}

fn candidate_line(entry: &RegistryEntry, defaults: &KindDefaults, active: bool) -> Line<'static> {
    let icon = entry
        .icon
        .clone()
        .unwrap_or_else(|| defaults.icon(entry.kind).to_string());
    let color = entry
        .color
        .as_deref()
        .unwrap_or_else(|| defaults.color(entry.kind));

    let mut label_style = chip_style(color);
    let mut kind_style = hint_style();
    if active {
        label_style = label_style.patch(active_candidate_style());
        kind_style = kind_style.patch(active_candidate_style());
    }
    Line::from(vec![
        Span::raw(format!("{icon} ")),
        Span::styled(entry.label.clone(), label_style),
        Span::styled(format!("  {}", entry.kind), kind_style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::editor::EditorConfig;
    use ratatui::backend::TestBackend;

    fn registry() -> MentionRegistry {
        MentionRegistry::new(vec![
            RegistryEntry::model("gpt-4", "GPT-4"),
            RegistryEntry::model("gpt-4o", "GPT-4o"),
            RegistryEntry::tool("web", "Web Search").with_icon("🔎"),
        ])
        .expect("registry")
    }

    fn composer(initial: &str) -> Composer {
        Composer::new(
            MentionEditor::new(initial, registry(), EditorConfig::default()),
            8,
        )
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> ComposerAction {
        map_key_event_to_action(&KeyEvent::new(code, modifiers)).expect("mapped key")
    }

    fn type_text(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_action(key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn key_mapping_covers_newline_and_cancel_chords() {
        assert_eq!(
            key(KeyCode::Enter, KeyModifiers::ALT),
            ComposerAction::Edit(EditorEvent::Insert('\n'))
        );
        assert_eq!(
            key(KeyCode::Char('j'), KeyModifiers::CONTROL),
            ComposerAction::Edit(EditorEvent::Insert('\n'))
        );
        assert_eq!(
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            ComposerAction::Cancel
        );
        assert_eq!(
            key(KeyCode::Enter, KeyModifiers::NONE),
            ComposerAction::Edit(EditorEvent::Key(CompletionKey::Enter))
        );
        assert!(
            map_key_event_to_action(&KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE)).is_none()
        );
    }

    #[test]
    fn enter_inserts_while_popup_open_then_submits() {
        let mut composer = composer("Ask ");
        type_text(&mut composer, "@web");
        assert!(composer.editor().popup().open);

        let step = composer.handle_action(key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(step, ComposerStep::Continue);
        assert_eq!(composer.editor().serialized(), "Ask [Tool:Web Search]\u{00A0}");

        let step = composer.handle_action(key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(
            step,
            ComposerStep::Finish(ComposerOutcome::Submitted(
                "Ask [Tool:Web Search]\u{00A0}".to_string()
            ))
        );
    }

    #[test]
    fn escape_closes_popup_before_cancelling() {
        let mut composer = composer("");
        type_text(&mut composer, "@gp");
        let step = composer.handle_action(key(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(step, ComposerStep::Continue);
        assert!(!composer.editor().popup().open);

        let step = composer.handle_action(key(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(step, ComposerStep::Finish(ComposerOutcome::Cancelled));
    }

    #[test]
    fn enter_on_empty_prompt_does_not_submit() {
        let mut composer = composer("");
        let step = composer.handle_action(key(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(step, ComposerStep::Continue);
    }

    #[test]
    fn tab_without_popup_inserts_spaces() {
        let mut composer = composer("a");
        composer.handle_action(key(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(composer.editor().serialized(), "a    ");
    }

    #[test]
    fn caret_position_uses_rendered_chip_width() {
        let composer = composer("Ask [Model:GPT-4]\u{00A0}x\nnext");
        let document = composer.editor().document();
        // "Ask " + "🤖 GPT-4" (2 + 1 + 5 columns) + nbsp
        assert_eq!(caret_position(document, 18), (0, 13));
        assert_eq!(caret_position(document, 19), (0, 14));
        assert_eq!(caret_position(document, 20), (1, 0));
        assert_eq!(caret_position(document, document.len()), (1, 4));
    }

    #[test]
    fn popup_window_follows_active_candidate() {
        let popup = PopupView {
            open: true,
            position: 0,
            candidates: registry().entries().to_vec(),
            active_index: 2,
        };
        let lines = popup_lines(&popup, &KindDefaults::default(), 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[1].content, "GPT-4o");
        assert_eq!(lines[1].spans[0].content, "🔎 ");
        assert_eq!(lines[1].spans[2].content, "  Tool");
    }

    #[test]
    fn renders_chip_and_open_popup() {
        let mut composer = composer("Ask [Model:GPT-4] ");
        type_text(&mut composer, "@web");
        let mut terminal = Terminal::new(TestBackend::new(50, composer.viewport_height()))
            .expect("terminal");
        terminal.draw(|f| composer.render(f)).expect("draw");

        assert!(row_text(&terminal, 0).contains("GPT-4"));
        assert!(row_text(&terminal, 4).contains("Enter/Tab insert"));
        assert!(row_text(&terminal, 5).contains("Web Search"));
    }

    #[test]
    fn renders_placeholder_when_empty() {
        let composer = composer("");
        let mut terminal = Terminal::new(TestBackend::new(50, composer.viewport_height()))
            .expect("terminal");
        terminal.draw(|f| composer.render(f)).expect("draw");
        assert!(row_text(&terminal, 0).starts_with("Type @ to mention a model or tool"));
        assert!(row_text(&terminal, 4).contains("Enter submit"));
    }
}
