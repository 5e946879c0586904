use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    /// Label returned for every upload. When unset the label is derived from the image bytes.
    pub stub_label: Option<String>,
    pub stub_confidence: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5000".into(),
            stub_label: None,
            stub_confidence: 0.87,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, Path::new(DEFAULT_SETTINGS_FILE));
    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
        Ok(file_cfg) => apply_table(settings, &file_cfg),
        Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
    }
}

fn apply_table(settings: &mut Settings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.server_bind = v.to_string();
    }
    if let Some(v) = file_cfg.get("stub_label").and_then(toml::Value::as_str) {
        settings.stub_label = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("stub_confidence") {
        if let Some(parsed) = v.as_float().or_else(|| v.as_integer().map(|i| i as f64)) {
            settings.stub_confidence = parsed;
        }
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("STUB_LABEL") {
        settings.stub_label = Some(v).filter(|label| !label.trim().is_empty());
    }

    if let Some(v) = var("APP__STUB_CONFIDENCE") {
        match v.parse::<f64>() {
            Ok(parsed) => settings.stub_confidence = parsed,
            Err(err) => warn!(value = %v, error = %err, "ignoring APP__STUB_CONFIDENCE"),
        }
    }

    settings.stub_confidence = settings.stub_confidence.clamp(0.0, 1.0);
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
