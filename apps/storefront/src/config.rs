use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::CartMode;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub cart_mode: CartMode,
    pub cart_id_path: PathBuf,
    pub notification_ms: u64,
    pub request_timeout_seconds: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            cart_mode: CartMode::Session,
            cart_id_path: default_cart_id_path(),
            notification_ms: 3000,
            request_timeout_seconds: 30,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.request_timeout_seconds))
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.server_url {
            self.server_url = v;
        }
        if let Some(v) = file.cart_mode {
            self.cart_mode = v;
        }
        if let Some(v) = file.cart_id_path {
            self.cart_id_path = v;
        }
        if let Some(v) = file.notification_ms {
            self.notification_ms = v;
        }
        if let Some(v) = file.request_timeout_seconds {
            self.request_timeout_seconds = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
    }

    /// Later keys win, so `APP__*` overrides the unprefixed names.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("STOREFRONT_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = var("APP__SERVER_URL") {
            self.server_url = v;
        }

        if let Some(v) = var("APP__CART_MODE") {
            if let Ok(parsed) = v.parse::<CartMode>() {
                self.cart_mode = parsed;
            }
        }

        if let Some(v) = var("APP__CART_ID_PATH") {
            self.cart_id_path = PathBuf::from(v);
        }

        if let Some(v) = var("APP__NOTIFICATION_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.notification_ms = parsed;
            }
        }

        if let Some(v) = var("APP__REQUEST_TIMEOUT_SECONDS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_seconds = parsed;
            }
        }

        if let Some(v) = var("RUST_LOG") {
            self.log_filter = v;
        }
        if let Some(v) = var("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    cart_mode: Option<CartMode>,
    cart_id_path: Option<PathBuf>,
    notification_ms: Option<u64>,
    request_timeout_seconds: Option<u64>,
    log_filter: Option<String>,
}

pub fn default_cart_id_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storefront")
        .join("cart.json")
}

/// Defaults, then the config file, then the environment. An explicit
/// `config_path` must exist; the default `storefront.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    config_path: Option<&Path>,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            settings.apply_file(file_cfg);
        }
        Err(err) if !required && err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    settings.apply_env(var);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
