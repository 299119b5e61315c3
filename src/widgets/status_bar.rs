use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::{AppState, Screen, ToastLevel};

pub fn help_text(state: &AppState) -> &'static str {
    match &state.screen {
        Screen::Login(_) => "Tab/↑↓ move  Enter next/login  F12 debug  Ctrl-Q quit",
        Screen::Form(fs) if fs.editing() => "type to edit  Enter newline  Esc close editor",
        Screen::Form(_) => {
            "Tab/↑↓ move  ←/→ choose  Space toggle  Enter activate  Ctrl-L logout  Ctrl-Q quit"
        }
    }
}

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans: Vec<Span> = Vec::new();
    if let Some(t) = &state.toast {
        let color = state.theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    spans.push(Span::styled(help_text(state), state.theme.text_muted()));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}
