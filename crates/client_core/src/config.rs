use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "explorer.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub profile_base_url: String,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            profile_base_url: "https://github.com/".into(),
            user_agent: concat!("activity-explorer/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    profile_base_url: Option<String>,
    user_agent: Option<String>,
}

/// Defaults, then `explorer.toml` in the working directory when present,
/// then environment overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    let path = Path::new(DEFAULT_SETTINGS_FILE);
    let file = if path.exists() { Some(path) } else { None };
    load_settings_from(file, |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(path) = file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg = parse_file_settings(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        apply_file_settings(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, env);
    Ok(settings)
}

fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str::<FileSettings>(raw)?)
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.api_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.profile_base_url {
        settings.profile_base_url = v;
    }
    if let Some(v) = file_cfg.user_agent {
        settings.user_agent = v;
    }
}

fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("EXPLORER_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__PROFILE_BASE_URL") {
        settings.profile_base_url = v;
    }
    if let Some(v) = env("APP__USER_AGENT") {
        settings.user_agent = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
