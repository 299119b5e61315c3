use crate::app::AppMsg;
use crate::model::User;
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    RollNumber,
    Name,
}

/// Login screen: collects the identity and shows the registration result.
#[derive(Debug, Default)]
pub struct LoginState {
    pub roll_number: String,
    pub name: String,
    pub roll_error: Option<String>,
    pub name_error: Option<String>,
    pub api_error: Option<String>,
    pub loading: bool,
    // 0 roll number, 1 name, 2 login button
    focus: usize,
}

impl LoginState {
    pub fn edit(&mut self, field: LoginField, value: String) {
        match field {
            LoginField::RollNumber => {
                self.roll_number = value;
                self.roll_error = None;
            }
            LoginField::Name => {
                self.name = value;
                self.name_error = None;
            }
        }
    }

    pub fn validate(&mut self) -> bool {
        self.roll_error = self
            .roll_number
            .trim()
            .is_empty()
            .then(|| "Roll Number is required".to_string());
        self.name_error = self
            .name
            .trim()
            .is_empty()
            .then(|| "Name is required".to_string());
        self.roll_error.is_none() && self.name_error.is_none()
    }

    pub fn user(&self) -> User {
        User {
            roll_number: self.roll_number.clone(),
            name: self.name.clone(),
        }
    }

    fn focused_input(&self) -> Option<(LoginField, &str)> {
        match self.focus {
            0 => Some((LoginField::RollNumber, self.roll_number.as_str())),
            1 => Some((LoginField::Name, self.name.as_str())),
            _ => None,
        }
    }

    fn input_lines(
        &self,
        idx: usize,
        label: &str,
        value: &str,
        placeholder: &str,
        error: Option<&str>,
        cursor_on: bool,
        theme: &Theme,
    ) -> Vec<Line<'static>> {
        let focused = self.focus == idx;
        let sel = if focused { '›' } else { ' ' };
        let label_style = if focused {
            theme.text_active_bold()
        } else {
            Style::default()
        };
        let mut out = vec![Line::from(vec![
            Span::raw(format!("{sel} ")),
            Span::styled(label.to_string(), label_style),
        ])];
        let mut spans = vec![Span::raw("  > ")];
        if value.is_empty() {
            spans.push(Span::styled(placeholder.to_string(), theme.text_muted()));
        } else {
            spans.push(Span::raw(value.to_string()));
        }
        if focused && cursor_on {
            spans.push(Span::raw("▏"));
        }
        out.push(Line::from(spans));
        if let Some(err) = error {
            out.push(Line::from(Span::styled(
                format!("  ! {err}"),
                theme.text_error(),
            )));
        }
        out
    }
}

impl crate::widgets::Widget for LoginState {
    fn render(&mut self, f: &mut Frame, area: Rect, theme: &Theme, tick: u64) {
        let cursor_on = tick % 2 == 0;
        let mut lines: Vec<Line> = Vec::new();
        if let Some(err) = &self.api_error {
            lines.push(Line::from(Span::styled(
                format!(" {err} "),
                Style::default()
                    .fg(theme.bg)
                    .bg(theme.error)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
        }
        lines.extend(self.input_lines(
            0,
            "Roll Number",
            &self.roll_number,
            "Enter your roll number",
            self.roll_error.as_deref(),
            cursor_on,
            theme,
        ));
        lines.push(Line::from(""));
        lines.extend(self.input_lines(
            1,
            "Name",
            &self.name,
            "Enter your name",
            self.name_error.as_deref(),
            cursor_on,
            theme,
        ));
        lines.push(Line::from(""));
        let button = if self.loading {
            let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][tick as usize % 6];
            format!("[ {spinner} Processing... ]")
        } else {
            "[ Login ]".to_string()
        };
        let style = if self.focus == 2 {
            theme.list_cursor_style()
        } else {
            theme.text_active_bold()
        };
        lines.push(Line::from(vec![Span::raw("  "), Span::styled(button, style)]));
        let block = panel_block("Student Login", true, theme);
        let p = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        f.render_widget(p, area);
    }

    fn on_key(&mut self, key: KeyEvent) -> Vec<AppMsg> {
        let mut msgs = Vec::new();
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % 3,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + 2) % 3,
            KeyCode::Enter => {
                if self.focus < 2 {
                    self.focus += 1;
                } else {
                    msgs.push(AppMsg::LoginSubmit);
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if let Some((field, cur)) = self.focused_input() {
                    let mut value = cur.to_string();
                    value.push(c);
                    msgs.push(AppMsg::LoginEdit { field, value });
                }
            }
            KeyCode::Backspace => {
                if let Some((field, cur)) = self.focused_input() {
                    let mut value = cur.to_string();
                    if value.pop().is_some() {
                        msgs.push(AppMsg::LoginEdit { field, value });
                    }
                }
            }
            _ => {}
        }
        msgs
    }
}
