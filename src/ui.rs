use crate::app::{update, AppMsg, Effect};
use crate::config::{load_config, AppConfig};
use crate::engine::Phase;
use crate::logging::init_logging;
use crate::model::FormValues;
use crate::services::api::ApiClient;
use crate::services::loader::{spawn_create_user, spawn_fetch_form, LoadMsg};
use crate::services::submit::{LogSubmitSink, SubmitSink};
use crate::theme::Theme;
use crate::widgets::chrome::centered_rect;
use crate::widgets::form_screen::FormScreen;
use crate::widgets::login::{LoginField, LoginState};
use crate::widgets::status_bar::draw_footer;
use crate::widgets::Widget;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(200);
// Toast lifetimes are given in seconds; the loop ticks 5 times a second
const TICKS_PER_SEC: u64 = 5;
const SUBMITTED_MSG: &str = "Form submitted successfully!";

pub enum Screen {
    Login(LoginState),
    Form(Box<FormScreen>),
}

impl Screen {
    fn name(&self) -> &'static str {
        match self {
            Screen::Login(_) => "login",
            Screen::Form(fs) => match fs.engine.phase() {
                Phase::Loading => "loading",
                Phase::Failed(_) => "failed",
                Phase::Ready(_) => "ready",
            },
        }
    }
}

#[derive(Clone, Copy)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) theme: Theme,
    pub(crate) screen: Screen,
    pub(crate) tick: u64,
    pub(crate) show_debug: bool,
    pub(crate) toast: Option<Toast>,
    // Debug log (rendered in the optional bottom pane)
    pub(crate) debug_log: VecDeque<String>,
    pub(crate) last_submission: Option<FormValues>,
    tx: Option<Sender<LoadMsg>>,
    rx: Option<Receiver<LoadMsg>>,
    sink: Box<dyn SubmitSink>,
    api: Option<ApiClient>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            theme: Theme::default(),
            screen: Screen::Login(LoginState::default()),
            tick: 0,
            show_debug: false,
            toast: None,
            debug_log: VecDeque::new(),
            last_submission: None,
            tx: None,
            rx: None,
            sink: Box::new(LogSubmitSink),
            api: None,
        }
    }
}

impl AppState {
    pub fn with_config(config: AppConfig) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url, config.request_timeout())?;
        let (tx, rx) = mpsc::channel::<LoadMsg>();
        Ok(Self {
            theme: Theme::from_mode(config.theme),
            show_debug: config.show_debug,
            config,
            tx: Some(tx),
            rx: Some(rx),
            api: Some(api),
            ..Default::default()
        })
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        let msg = msg.into();
        tracing::debug!(target: "formflow::ui", "{msg}");
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg);
    }

    fn show_toast(&mut self, text: String, level: ToastLevel, seconds: u64) {
        self.toast = Some(Toast {
            text,
            level,
            expires_at_tick: self.tick + seconds * TICKS_PER_SEC,
        });
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::CreateUser { user } => {
                tracing::info!(roll_number = %user.roll_number, "registering user");
                match (state.api.clone(), state.tx.clone()) {
                    (Some(api), Some(tx)) => spawn_create_user(api, user, tx),
                    _ => state.dbg("create user skipped: no API client"),
                }
            }
            Effect::FetchForm { roll_number } => {
                tracing::info!(roll_number = %roll_number, "fetching form schema");
                state.dbg(format!("fetch form for {roll_number}"));
                match (state.api.clone(), state.tx.clone()) {
                    (Some(api), Some(tx)) => spawn_fetch_form(api, roll_number, tx),
                    _ => state.dbg("fetch skipped: no API client"),
                }
            }
            Effect::SubmitForm { values } => match state.sink.submit(&values) {
                Ok(()) => {
                    let json = serde_json::to_string(&values).unwrap_or_default();
                    state.dbg(format!("submitted: {json}"));
                    state.last_submission = Some(values);
                    state.show_toast(SUBMITTED_MSG.to_string(), ToastLevel::Success, 3);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "submit sink failed");
                    state.dbg(format!("submit failed: {e:#}"));
                    state.show_toast(format!("Submit failed: {e}"), ToastLevel::Error, 4);
                }
            },
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => state.show_toast(text, level, seconds),
        }
    }
}

fn dispatch(state: &mut AppState, msg: AppMsg) {
    let effects = update(state, msg);
    run_effects(state, effects);
}

/// Apply finished background work.
fn drain_loader(state: &mut AppState) {
    let mut drained: Vec<LoadMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    for msg in drained {
        dispatch(state, msg.into());
    }
}

/// Route one key press. Returns true when the app should quit.
fn handle_key(state: &mut AppState, key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return true;
    }
    if key.code == KeyCode::F(12) {
        dispatch(state, AppMsg::ToggleDebug);
        return false;
    }
    let msgs = match &mut state.screen {
        Screen::Login(ls) => ls.on_key(key),
        Screen::Form(fs) => fs.on_key(key),
    };
    for msg in msgs {
        dispatch(state, msg);
    }
    false
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run() -> Result<()> {
    let (config, config_path) = load_config()?;
    let logging = init_logging(&config)?;
    tracing::info!(api = %config.api_base_url, "starting formflow");
    let mut state = AppState::with_config(config)?;
    match config_path {
        Some(p) => state.dbg(format!("config: {}", p.display())),
        None => state.dbg("config: defaults"),
    }
    if let Some(api) = &state.api {
        let url = api.base_url().to_string();
        state.dbg(format!("api: {url}"));
    }
    if !logging {
        state.dbg("file logging disabled");
    }
    if env_flag("FORMFLOW_HEADLESS") {
        return run_headless(&mut state);
    }
    run_interactive(&mut state)
}

// Headless smoke mode
fn run_headless(state: &mut AppState) -> Result<()> {
    let ticks: u64 = std::env::var("FORMFLOW_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let roll = std::env::var("FORMFLOW_HEADLESS_ROLL").ok();
    let name = std::env::var("FORMFLOW_HEADLESS_NAME").ok();
    let summary = env_flag("FORMFLOW_SMOKE_SUMMARY");
    let backend = ratatui::backend::TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend)?;
    let mut login_sent = false;
    if let (Some(roll), Some(name)) = (roll, name) {
        dispatch(
            state,
            AppMsg::LoginEdit {
                field: LoginField::RollNumber,
                value: roll,
            },
        );
        dispatch(
            state,
            AppMsg::LoginEdit {
                field: LoginField::Name,
                value: name,
            },
        );
        dispatch(state, AppMsg::LoginSubmit);
        login_sent = true;
    }
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, state))?;
        drain_loader(state);
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(TICK_RATE);
    }
    if summary {
        let (section, sections) = match &state.screen {
            Screen::Form(fs) => fs
                .engine
                .session()
                .map(|s| (s.current_index() + 1, s.section_count()))
                .unwrap_or((0, 0)),
            Screen::Login(_) => (0, 0),
        };
        let api_error = match &state.screen {
            Screen::Login(ls) => ls.api_error.clone(),
            Screen::Form(_) => None,
        };
        let screen = state.screen.name();
        let summary = serde_json::json!({
            "ok": api_error.is_none() && screen != "failed",
            "screen": screen,
            "section": section,
            "sections": sections,
            "login_sent": login_sent,
            "api_error": api_error,
            "api": state.config.api_base_url,
        });
        println!("{summary}");
    }
    Ok(())
}

fn run_interactive(state: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut last_tick = Instant::now();
    let res: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, state)) {
            break Err(e.into());
        }
        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if handle_key(state, key) {
                        break Ok(());
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        drain_loader(state);
        if last_tick.elapsed() >= TICK_RATE {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    let screen = f.area();
    f.render_widget(Block::default().style(state.theme.base_style()), screen);

    // 5% side margins
    let layout_h = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(5),
            Constraint::Percentage(90),
            Constraint::Percentage(5),
        ])
        .split(screen);
    let content_area = layout_h[1];

    const DEBUG_H: u16 = 6;
    let mut constraints = vec![Constraint::Length(1), Constraint::Min(0)];
    if state.show_debug {
        constraints.push(Constraint::Length(DEBUG_H));
    }
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(content_area);

    draw_header(f, chunks[0], state);
    let main = chunks[1];
    match &mut state.screen {
        Screen::Login(ls) => {
            let area = centered_rect(60, 80, main);
            ls.render(f, area, &state.theme, state.tick);
        }
        Screen::Form(fs) => fs.render(f, main, &state.theme, state.tick),
    }
    if state.show_debug {
        draw_debug(f, chunks[2], state);
    }
    draw_footer(f, chunks[chunks.len() - 1], state);
}

fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let line = Line::from(vec![
        Span::styled(" FormFlow ", state.theme.title_style()),
        Span::styled(format!("· {}", state.screen.name()), state.theme.text_muted()),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(state.theme.text_muted())
        .title(Span::styled(
            "Debug",
            state.theme.text_muted().add_modifier(Modifier::BOLD),
        ));
    // Take last `area.height` lines
    let h = area.height as usize;
    let start = state.debug_log.len().saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(state.theme.text_muted())
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
