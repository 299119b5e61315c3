pub mod chrome;
pub mod field;
pub mod form_screen;
pub mod login;
pub mod section;
pub mod status_bar;

use crate::app::AppMsg;
use crate::theme::Theme;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A full-screen step of the app.
pub trait Widget {
    fn render(&mut self, f: &mut Frame, area: Rect, theme: &Theme, tick: u64);
    fn on_key(&mut self, key: KeyEvent) -> Vec<AppMsg> {
        let _ = key;
        Vec::new()
    }
}
