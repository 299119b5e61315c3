use crate::app::AppMsg;
use crate::engine::{FormEngine, Phase};
use crate::model::{FieldSchema, FieldType, FieldValue};
use crate::theme::Theme;
use crate::widgets::chrome::{centered_rect, panel_block};
use crate::widgets::field::FieldChange;
use crate::widgets::section::{SectionAction, SectionEvent, SectionFocus, SectionView};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;
use tui_textarea::{CursorMove, TextArea};

const SPINNER: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

// Multi-line editor opened over a textarea field
struct TextEditor {
    field_id: String,
    label: String,
    max_length: Option<usize>,
    area: TextArea<'static>,
}

impl TextEditor {
    fn open(field: &FieldSchema, current: &str) -> Self {
        Self {
            field_id: field.field_id.clone(),
            label: field.label.clone(),
            max_length: field.max_length,
            area: editor_area(current),
        }
    }

    fn text(&self) -> String {
        self.area.lines().join("\n")
    }

    /// Feed one key; returns the new text when it changed.
    fn input(&mut self, key: KeyEvent) -> Option<String> {
        let before = self.text();
        let (row, col) = self.area.cursor();
        self.area.input(key);
        let after = self.text();
        if let Some(max) = self.max_length {
            if after.chars().count() > max {
                // Over the cap: put the previous text and cursor back
                self.area = editor_area(&before);
                self.area.move_cursor(CursorMove::Jump(row as u16, col as u16));
                return None;
            }
        }
        (after != before).then_some(after)
    }
}

// Editor holding `text` with the cursor at the very end
fn editor_area(text: &str) -> TextArea<'static> {
    let mut area = TextArea::new(text.split('\n').map(str::to_string).collect());
    area.move_cursor(CursorMove::Bottom);
    area.move_cursor(CursorMove::End);
    area
}

/// The form step: loading, failure or the current section with progress.
pub struct FormScreen {
    pub engine: FormEngine,
    pub focus: SectionFocus,
    editor: Option<TextEditor>,
}

impl FormScreen {
    pub fn new(engine: FormEngine) -> Self {
        Self {
            engine,
            focus: SectionFocus::default(),
            editor: None,
        }
    }

    pub fn editing(&self) -> bool {
        self.editor.is_some()
    }

    fn draw_loading(&self, f: &mut Frame, area: Rect, theme: &Theme, tick: u64) {
        let spinner = SPINNER[tick as usize % SPINNER.len()];
        let p = Paragraph::new(Line::from(Span::styled(
            format!(" {spinner} Loading form..."),
            theme.text_muted(),
        )))
        .block(panel_block("Form", true, theme));
        f.render_widget(p, area);
    }

    fn draw_failed(&self, f: &mut Frame, area: Rect, msg: &str, theme: &Theme) {
        let lines = vec![
            Line::from(Span::styled(msg.to_string(), theme.text_error())),
            Line::from(""),
            Line::from(vec![
                Span::raw("  "),
                Span::styled("[ Go Back ]", theme.list_cursor_style()),
            ]),
        ];
        let p = Paragraph::new(lines)
            .block(panel_block("Form unavailable", true, theme))
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
    }

    fn draw_ready(&mut self, f: &mut Frame, area: Rect, theme: &Theme, tick: u64) {
        let Some(session) = self.engine.session() else {
            return;
        };
        let user = self.engine.user();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let header = Line::from(vec![
            Span::styled(
                format!(" {} ({}) ", user.name, user.roll_number),
                theme.text_active_bold(),
            ),
            Span::styled(" Ctrl-L logout", theme.text_muted()),
        ]);
        f.render_widget(Paragraph::new(header), chunks[0]);

        let n = session.section_count();
        let i = session.current_index();
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.primary).bg(theme.bg))
            .ratio((i + 1) as f64 / n.max(1) as f64)
            .label(format!("Section {} of {}", i + 1, n));
        f.render_widget(gauge, chunks[1]);

        let view = SectionView {
            section: session.current_section(),
            store: session.store(),
            is_first: session.is_first(),
            is_last: session.is_last(),
        };
        let (lines, focus_line) = view.lines(&self.focus, tick % 2 == 0, theme);
        // Keep the focused item a few rows into view
        let inner_h = chunks[2].height.saturating_sub(2) as usize;
        let scroll = (focus_line + 4).saturating_sub(inner_h);
        let p = Paragraph::new(lines)
            .block(panel_block(&session.schema().form_title, true, theme))
            .scroll((scroll as u16, 0));
        f.render_widget(p, chunks[2]);

        if let Some(ed) = &mut self.editor {
            ed.area.set_block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border_focused())
                    .title(format!("Editing: {} (Esc to close)", ed.label)),
            );
            let rect = centered_rect(80, 60, area);
            f.render_widget(Clear, rect);
            f.render_widget(&ed.area, rect);
        }
    }

    fn editor_key(&mut self, key: KeyEvent) -> Vec<AppMsg> {
        let Some(ed) = &mut self.editor else {
            return Vec::new();
        };
        if key.code == KeyCode::Esc {
            self.editor = None;
            return Vec::new();
        }
        match ed.input(key) {
            Some(text) => vec![AppMsg::FieldChanged(FieldChange {
                field_id: ed.field_id.clone(),
                value: FieldValue::Text(text),
            })],
            None => Vec::new(),
        }
    }
}

impl crate::widgets::Widget for FormScreen {
    fn render(&mut self, f: &mut Frame, area: Rect, theme: &Theme, tick: u64) {
        match self.engine.phase() {
            Phase::Loading => self.draw_loading(f, area, theme, tick),
            Phase::Failed(msg) => self.draw_failed(f, area, msg, theme),
            Phase::Ready(_) => self.draw_ready(f, area, theme, tick),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<AppMsg> {
        if self.editor.is_some() {
            return self.editor_key(key);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('l') {
            return vec![AppMsg::Logout];
        }
        let session = match self.engine.phase() {
            Phase::Loading => return Vec::new(),
            Phase::Failed(_) => {
                return match key.code {
                    KeyCode::Enter | KeyCode::Esc => vec![AppMsg::Logout],
                    _ => Vec::new(),
                };
            }
            Phase::Ready(session) => session,
        };
        let view = SectionView {
            section: session.current_section(),
            store: session.store(),
            is_first: session.is_first(),
            is_last: session.is_last(),
        };
        if key.code == KeyCode::Enter {
            if let Some(field) = view
                .focused_field(&self.focus)
                .and_then(|i| view.section.fields.get(i))
            {
                if matches!(field.kind, FieldType::TextArea) {
                    let current = view
                        .store
                        .values()
                        .get(&field.field_id)
                        .and_then(FieldValue::as_text)
                        .unwrap_or_default();
                    self.editor = Some(TextEditor::open(field, current));
                    return Vec::new();
                }
            }
        }
        match view.on_key(&mut self.focus, key) {
            Some(SectionEvent::Change(change)) => vec![AppMsg::FieldChanged(change)],
            Some(SectionEvent::Action(SectionAction::Next)) => vec![AppMsg::Next],
            Some(SectionEvent::Action(SectionAction::Previous)) => vec![AppMsg::Prev],
            Some(SectionEvent::Action(SectionAction::Submit)) => vec![AppMsg::Submit],
            None => Vec::new(),
        }
    }
}
