use std::{collections::HashMap, fs, path::Path, time::Duration};

use tracing::warn;

use crate::{controller::ControllerSettings, error::ClientError, PredictionEndpoint};

pub const DEFAULT_SETTINGS_FILE: &str = "leafscan.toml";

/// Front-end settings shared by the desktop binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub server_url: String,
    /// When set, images go to `{api_base_url}/predict` instead of `{server_url}/upload`.
    pub api_base_url: Option<String>,
    pub preview_delay_ms: u64,
    pub progress_tick_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        let controller = ControllerSettings::default();
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            api_base_url: None,
            preview_delay_ms: controller.preview_delay.as_millis() as u64,
            progress_tick_ms: controller.progress_tick.as_millis() as u64,
        }
    }
}

impl ClientSettings {
    pub fn endpoint(&self) -> Result<PredictionEndpoint, ClientError> {
        PredictionEndpoint::resolve(&self.server_url, self.api_base_url.as_deref())
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            preview_delay: Duration::from_millis(self.preview_delay_ms),
            progress_tick: Duration::from_millis(self.progress_tick_ms.max(1)),
            ..ControllerSettings::default()
        }
    }
}

/// Defaults, then `path` (if readable), then the process environment.
pub fn load_settings(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();
    apply_file(&mut settings, path);
    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file(settings: &mut ClientSettings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
        Ok(file_cfg) => apply_table(settings, &file_cfg),
        Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
    }
}

fn apply_table(settings: &mut ClientSettings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
        settings.server_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = non_blank(v);
    }
    if let Some(v) = file_cfg.get("preview_delay_ms").and_then(toml::Value::as_integer) {
        settings.preview_delay_ms = v.max(0) as u64;
    }
    if let Some(v) = file_cfg.get("progress_tick_ms").and_then(toml::Value::as_integer) {
        settings.progress_tick_ms = v.max(1) as u64;
    }
}

fn apply_env(settings: &mut ClientSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("API_BASE_URL") {
        settings.api_base_url = non_blank(&v);
    }
    if let Some(v) = var("APP__PREVIEW_DELAY_MS") {
        match v.parse() {
            Ok(ms) => settings.preview_delay_ms = ms,
            Err(err) => warn!(value = %v, error = %err, "ignoring APP__PREVIEW_DELAY_MS"),
        }
    }
    if let Some(v) = var("APP__PROGRESS_TICK_MS") {
        match v.parse::<u64>() {
            Ok(ms) if ms > 0 => settings.progress_tick_ms = ms,
            Ok(_) => warn!("ignoring zero APP__PROGRESS_TICK_MS"),
            Err(err) => warn!(value = %v, error = %err, "ignoring APP__PROGRESS_TICK_MS"),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
