//! Configuration for the PDF chat service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "PDF_CHAT_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Upload limits
    pub upload: UploadConfig,
    /// Conversation history configuration
    pub history: HistoryConfig,
    /// Gemini model configuration
    pub model: ModelConfig,
    /// SQLite storage configuration
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration: the TOML file named by `PDF_CHAT_CONFIG` if set, otherwise
    /// defaults. Environment variables override either source.
    pub fn load() -> Result<Self> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Read a TOML configuration file; missing sections and keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid config file {}: {}", path.display(), e)))
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(host) = env_string("HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("PORT")? {
            self.server.port = port;
        }
        if let Some(mb) = env_parse("MAX_BODY_SIZE_MB")? {
            self.upload.max_body_size_mb = mb;
        }
        if let Some(limit) = env_parse("HISTORY_LIMIT")? {
            self.history.capacity = limit;
        }
        if let Some(key) = env_string("GEMINI_API_KEY") {
            self.model.api_key = key;
        }
        if let Some(name) = env_string("GEMINI_MODEL_NAME") {
            self.model.model_name = name;
        }
        if let Some(url) = env_string("GEMINI_BASE_URL") {
            self.model.base_url = url;
        }
        if let Some(path) = env_string("DATABASE_PATH") {
            self.storage.database_path = PathBuf::from(path);
        }
        Ok(self)
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.upload.max_body_size_mb == 0 {
            return Err(Error::Config("upload.max_body_size_mb must be at least 1".into()));
        }
        if self.history.capacity == 0 {
            return Err(Error::Config("history.capacity must be at least 1".into()));
        }
        if self.model.api_key.trim().is_empty() || self.model.model_name.trim().is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEY and GEMINI_MODEL_NAME must be set".into(),
            ));
        }
        Ok(())
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::Config(format!("{} = {:?}: {}", name, raw, e)))
        })
        .transpose()
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Upload limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum upload body size in MiB (default: 1)
    pub max_body_size_mb: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_body_size_mb: 1 }
    }
}

/// Conversation history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Turns retained per document (default: 30)
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::cache::history::DEFAULT_CAPACITY,
        }
    }
}

/// Gemini model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// API key sent as `x-goog-api-key`
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Model name, e.g. "gemini-1.5-flash"
    pub model_name: String,
    /// Generative Language API base URL
    pub base_url: String,
    /// Request timeout in seconds, covering the whole streamed reply
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_name: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 120,
            temperature: 0.3,
        }
    }
}

/// SQLite storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file for documents and request logs
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let database_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pdf-chat")
            .join("pdf-chat.db");

        Self { database_path }
    }
}
