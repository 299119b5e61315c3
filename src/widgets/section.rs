use crate::engine::store::FormStore;
use crate::model::FormSectionSchema;
use crate::theme::Theme;
use crate::widgets::field::{field_lines, handle_key as field_key, render_value, FieldChange};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAction {
    Previous,
    Next,
    Submit,
}

impl SectionAction {
    pub fn label(self) -> &'static str {
        match self {
            SectionAction::Previous => "Previous",
            SectionAction::Next => "Next",
            SectionAction::Submit => "Submit",
        }
    }
}

/// What a key press on the section asks the owner to do.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionEvent {
    Change(FieldChange),
    Action(SectionAction),
}

/// Buttons under a section: "Previous" unless first, then exactly one of
/// "Next" / "Submit".
pub fn section_actions(is_first: bool, is_last: bool) -> Vec<SectionAction> {
    let mut out = Vec::with_capacity(2);
    if !is_first {
        out.push(SectionAction::Previous);
    }
    out.push(if is_last {
        SectionAction::Submit
    } else {
        SectionAction::Next
    });
    out
}

/// View-side cursor state for the visible section.
#[derive(Debug, Clone, Default)]
pub struct SectionFocus {
    // fields first, then action buttons
    pub index: usize,
    // option cursor per multi-select field
    pub cursors: HashMap<String, usize>,
}

impl SectionFocus {
    pub fn reset(&mut self) {
        self.index = 0;
        self.cursors.clear();
    }
}

/// Read-only projection of one section over the engine's store.
pub struct SectionView<'a> {
    pub section: &'a FormSectionSchema,
    pub store: &'a FormStore,
    pub is_first: bool,
    pub is_last: bool,
}

impl<'a> SectionView<'a> {
    pub fn actions(&self) -> Vec<SectionAction> {
        section_actions(self.is_first, self.is_last)
    }

    fn focus_len(&self) -> usize {
        self.section.fields.len() + self.actions().len()
    }

    /// Index of the focused field, if focus is on a field.
    pub fn focused_field(&self, focus: &SectionFocus) -> Option<usize> {
        (focus.index < self.section.fields.len()).then_some(focus.index)
    }

    /// Render the section. Returns the lines and the line where the focused
    /// item starts, for scrolling.
    pub fn lines(
        &self,
        focus: &SectionFocus,
        cursor_on: bool,
        theme: &Theme,
    ) -> (Vec<Line<'static>>, usize) {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut focus_line = 0;
        lines.push(Line::from(Span::styled(
            self.section.title.clone(),
            theme.title_style(),
        )));
        if let Some(desc) = &self.section.description {
            lines.push(Line::from(Span::styled(desc.clone(), theme.text_muted())));
        }
        lines.push(Line::from(""));
        for (i, field) in self.section.fields.iter().enumerate() {
            let focused = focus.index == i;
            if focused {
                focus_line = lines.len();
            }
            let value = render_value(field, self.store.values());
            let cursor = focus.cursors.get(&field.field_id).copied().unwrap_or(0);
            lines.extend(field_lines(
                field,
                &value,
                self.store.error_for(&field.field_id),
                focused,
                cursor,
                cursor_on,
                theme,
            ));
            lines.push(Line::from(""));
        }
        let first_action = self.section.fields.len();
        if focus.index >= first_action {
            focus_line = lines.len();
        }
        let mut spans: Vec<Span<'static>> = vec![Span::raw("  ")];
        for (ai, action) in self.actions().into_iter().enumerate() {
            let style = if focus.index == first_action + ai {
                theme.list_cursor_style()
            } else if action == SectionAction::Submit {
                theme.text_success()
            } else {
                theme.text_active_bold()
            };
            spans.push(Span::styled(format!("[ {} ]", action.label()), style));
            spans.push(Span::raw("  "));
        }
        lines.push(Line::from(spans));
        (lines, focus_line)
    }

    /// Route one key press. Focus movement is handled here; edits are
    /// delegated to the focused control.
    pub fn on_key(&self, focus: &mut SectionFocus, key: KeyEvent) -> Option<SectionEvent> {
        let total = self.focus_len();
        let fields = &self.section.fields;
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                focus.index = (focus.index + 1) % total;
                return None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                focus.index = (focus.index + total - 1) % total;
                return None;
            }
            _ => {}
        }
        if let Some(field) = fields.get(focus.index) {
            if key.code == KeyCode::Enter {
                focus.index = (focus.index + 1) % total;
                return None;
            }
            let value = render_value(field, self.store.values());
            let cursor = focus.cursors.entry(field.field_id.clone()).or_insert(0);
            return field_key(field, &value, cursor, key).map(SectionEvent::Change);
        }
        let actions = self.actions();
        let ai = focus.index - fields.len();
        match key.code {
            KeyCode::Left if ai > 0 => {
                focus.index -= 1;
                None
            }
            KeyCode::Right if ai + 1 < actions.len() => {
                focus.index += 1;
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => actions.get(ai).copied().map(SectionEvent::Action),
            _ => None,
        }
    }
}
