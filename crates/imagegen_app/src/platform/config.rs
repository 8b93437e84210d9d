//! Shell configuration, read from a RON file with environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_logging::engine_info;
use imagegen_core::{CoreConfig, HistoryLimit, DEFAULT_MAX_ATTACHMENT_BYTES, PREVIEW_HISTORY_LIMIT};
use imagegen_engine::ServiceSettings;
use serde::{Deserialize, Serialize};

use super::i18n::Language;

pub const DEFAULT_CONFIG_FILE: &str = "imagegen.ron";

const ENV_SERVICE_URL: &str = "IMAGEGEN_SERVICE_URL";
const ENV_API_KEY: &str = "IMAGEGEN_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryBackend {
    /// PostgREST `image_history` table on the service.
    Remote,
    /// Kept in memory for the lifetime of the process.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_url: String,
    pub api_key: String,
    /// `None` shows the full history instead of the recent preview.
    pub history_limit: Option<usize>,
    pub history_backend: HistoryBackend,
    pub anonymous_history: bool,
    pub request_timeout_secs: u64,
    pub max_attachment_bytes: usize,
    pub download_dir: PathBuf,
    pub state_file: PathBuf,
    pub log_file: PathBuf,
    /// Used until the user picks a language.
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        let service = ServiceSettings::default();
        Self {
            service_url: service.base_url,
            api_key: service.api_key,
            history_limit: Some(PREVIEW_HISTORY_LIMIT),
            history_backend: HistoryBackend::Remote,
            anonymous_history: false,
            request_timeout_secs: service.request_timeout.as_secs(),
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            download_dir: PathBuf::from("downloads"),
            state_file: PathBuf::from(".imagegen_state.ron"),
            log_file: PathBuf::from(engine_logging::DEFAULT_LOG_FILE),
            language: Language::En,
        }
    }
}

impl AppConfig {
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.service_url.clone(),
            api_key: self.api_key.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..ServiceSettings::default()
        }
    }

    pub fn core_config(&self) -> CoreConfig {
        CoreConfig {
            history_limit: self
                .history_limit
                .map_or(HistoryLimit::All, HistoryLimit::Recent),
            anonymous_history: self.anonymous_history,
            max_attachment_bytes: self.max_attachment_bytes,
        }
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_SERVICE_URL) {
            self.service_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = key;
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = match fs::read_to_string(path) {
        Ok(text) => parse(&text).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    engine_info!("Loaded configuration from {:?}", path);
    Ok(config.apply_overrides(|key| std::env::var(key).ok()))
}

fn parse(text: &str) -> Result<AppConfig, String> {
    ron::from_str(text).map_err(|err| err.to_string())
}
