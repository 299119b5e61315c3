use crate::services::api::DEFAULT_BASE_URL;
use crate::theme::ThemeMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "formflow.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub log_file: Option<PathBuf>,
    pub theme: ThemeMode,
    pub show_debug: bool,
    /// Absent means requests never time out.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            log_file: None,
            theme: ThemeMode::default(),
            show_debug: false,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// First existing config file: `$FORMFLOW_CONFIG_DIR/formflow.yaml`, then
/// `./formflow.yaml`, then `./.formflow/formflow.yaml`.
pub fn find_config_file(config_dir: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(dir) = config_dir {
        candidates.push(dir.join(CONFIG_FILE));
    }
    candidates.push(cwd.join(CONFIG_FILE));
    candidates.push(cwd.join(".formflow").join(CONFIG_FILE));
    candidates.into_iter().find(|p| p.is_file())
}

pub fn read_config(path: &Path) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    // An empty file is a valid, all-defaults config
    if s.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(&s).with_context(|| format!("parsing {path:?}"))
}

pub fn apply_env_overrides(cfg: &mut AppConfig, get: impl Fn(&str) -> Option<String>) {
    if let Some(url) = get("FORMFLOW_API_URL").filter(|s| !s.trim().is_empty()) {
        cfg.api_base_url = url;
    }
    if let Some(path) = get("FORMFLOW_LOG_FILE").filter(|s| !s.trim().is_empty()) {
        cfg.log_file = Some(PathBuf::from(path));
    }
}

/// Resolve the effective config from the process environment.
pub fn load_config() -> Result<(AppConfig, Option<PathBuf>)> {
    let config_dir = std::env::var("FORMFLOW_CONFIG_DIR").ok().map(PathBuf::from);
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let found = find_config_file(config_dir.as_deref(), &cwd);
    let mut cfg = match &found {
        Some(p) => read_config(p)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    Ok((cfg, found))
}
