//! Configuration types for pipelines, fetching, record storage and logging.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{IngestError, Result};
use crate::records::{JsonFileRecordStore, RecordManager};

/// Environment variable overriding [`PipelineConfig::step_timeout_seconds`].
/// `0` or `none` disables the timeout.
pub const ENV_STEP_TIMEOUT: &str = "INGESTFLOW_STEP_TIMEOUT";
/// Environment variable overriding [`PipelineConfig::max_concurrency`].
pub const ENV_MAX_CONCURRENCY: &str = "INGESTFLOW_MAX_CONCURRENCY";
/// Environment variable selecting the JSON record store directory.
pub const ENV_RECORDS_DIR: &str = "INGESTFLOW_RECORDS_DIR";
/// Environment variable overriding [`LoggingConfig::level`].
pub const ENV_LOG_LEVEL: &str = "INGESTFLOW_LOG_LEVEL";

/// Step time budget used when no configuration is given.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Per-step time budget in seconds; `None` disables it.
    #[serde(default = "default_step_timeout")]
    pub step_timeout_seconds: Option<f64>,
    /// Maximum number of items processed at once by `run_batch`.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Transcript fetching.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Action log storage.
    #[serde(default)]
    pub records: RecordStoreConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[allow(clippy::unnecessary_wraps)]
const fn default_step_timeout() -> Option<f64> {
    Some(60.0)
}

const fn default_max_concurrency() -> usize {
    4
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            step_timeout_seconds: default_step_timeout(),
            max_concurrency: default_max_concurrency(),
            fetch: FetchConfig::default(),
            records: RecordStoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Sets the step timeout.
    #[must_use]
    pub const fn with_step_timeout(mut self, seconds: Option<f64>) -> Self {
        self.step_timeout_seconds = seconds;
        self
    }

    /// Sets the batch concurrency.
    #[must_use]
    pub const fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n;
        self
    }

    /// Sets the record store.
    #[must_use]
    pub fn with_records(mut self, records: RecordStoreConfig) -> Self {
        self.records = records;
        self
    }

    /// Step timeout as a `Duration`; `None` when disabled.
    pub fn step_timeout(&self) -> Result<Option<Duration>> {
        self.step_timeout_seconds
            .map(|t| seconds("step_timeout_seconds", t))
            .transpose()
    }

    /// Applies the `INGESTFLOW_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_STEP_TIMEOUT) {
            self.step_timeout_seconds = match raw.trim() {
                "0" | "none" => None,
                value => Some(value.parse().map_err(|_| {
                    IngestError::config(format!("{ENV_STEP_TIMEOUT}: not a number: {value}"))
                })?),
            };
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENCY) {
            self.max_concurrency = raw.trim().parse().map_err(|_| {
                IngestError::config(format!("{ENV_MAX_CONCURRENCY}: not an integer: {raw}"))
            })?;
        }
        if let Some(dir) = lookup(ENV_RECORDS_DIR) {
            self.records = RecordStoreConfig::JsonDir { path: dir.into() };
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        self.validate()
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(IngestError::config("max_concurrency must be at least 1"));
        }
        self.step_timeout()?;
        self.fetch.validate()
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration> {
    if !value.is_finite() || value <= 0.0 {
        return Err(IngestError::config(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| IngestError::config(format!("{field} out of range ({value}): {e}")))
}

/// Configuration for transcript fetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timed-text endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Preferred transcript language.
    #[serde(default = "default_language")]
    pub language: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "https://www.youtube.com/api/timedtext".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

const fn default_fetch_timeout() -> f64 {
    30.0
}

fn default_user_agent() -> String {
    concat!("ingestflow/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            timeout_seconds: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Sets the endpoint.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Result<Duration> {
        seconds("fetch.timeout_seconds", self.timeout_seconds)
    }

    /// Checks the endpoint and timeout.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(IngestError::config("fetch.base_url must not be empty"));
        }
        self.timeout().map(|_| ())
    }
}

/// Where action logs are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum RecordStoreConfig {
    /// Process memory only.
    #[default]
    Memory,
    /// One JSON document per item under `path`.
    JsonDir {
        /// Store directory.
        path: PathBuf,
    },
}

impl RecordStoreConfig {
    /// Opens the configured store.
    pub fn build(&self) -> Result<RecordManager> {
        match self {
            Self::Memory => Ok(RecordManager::in_memory()),
            Self::JsonDir { path } => Ok(RecordManager::new(Arc::new(
                JsonFileRecordStore::open(path)?,
            ))),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
