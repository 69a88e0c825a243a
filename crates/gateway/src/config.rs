use std::fs;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8000";
const SETTINGS_FILE: &str = "gateway.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub backend_base_url: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            backend_base_url: DEFAULT_BACKEND_BASE_URL.into(),
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    backend_base_url: Option<String>,
    max_body_bytes: Option<usize>,
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(SETTINGS_FILE).ok();
    resolve_settings(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Layers defaults, then the settings file, then environment overrides.
pub(crate) fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.bind_addr = v;
                }
                if let Some(v) = file_cfg.backend_base_url {
                    settings.backend_base_url = v;
                }
                if let Some(v) = file_cfg.max_body_bytes {
                    settings.max_body_bytes = v;
                }
            }
            Err(error) => warn!(%error, file = SETTINGS_FILE, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("GATEWAY_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = env("BACKEND_BASE_URL") {
        settings.backend_base_url = v;
    }
    if let Some(v) = env("APP__BACKEND_BASE_URL") {
        settings.backend_base_url = v;
    }

    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        match v.parse::<usize>() {
            Ok(parsed) => settings.max_body_bytes = parsed,
            Err(error) => warn!(%error, value = %v, "ignoring invalid APP__MAX_BODY_BYTES"),
        }
    }

    settings.backend_base_url = normalize_backend_base_url(&settings.backend_base_url);
    settings
}

pub fn prepare_backend_base_url(raw_base_url: &str) -> anyhow::Result<String> {
    let base_url = normalize_backend_base_url(raw_base_url);
    let parsed = Url::parse(&base_url)
        .with_context(|| format!("invalid backend base url '{base_url}'"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "backend base url '{base_url}' must use http or https, got '{}'",
            parsed.scheme()
        );
    }
    if parsed.host_str().is_none() {
        bail!("backend base url '{base_url}' has no host");
    }

    Ok(base_url)
}

pub(crate) fn normalize_backend_base_url(raw_base_url: &str) -> String {
    let trimmed = raw_base_url.trim().trim_end_matches('/');

    if trimmed.is_empty() {
        return DEFAULT_BACKEND_BASE_URL.to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
