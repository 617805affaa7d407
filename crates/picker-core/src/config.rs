use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::selection::SELECTION_KEY;

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub assistant: AssistantConfig,
    pub catalog: CatalogConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from default path (~/.config/beauty-picker/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beauty-picker")
            .join("config.toml")
    }

    /// Data directory for the selection store and REPL history.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("beauty-picker")
    }
}

/// Remote chat endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// URL the conversation is POSTed to.
    pub endpoint: String,
    /// Model identifier forwarded in the request body.
    pub model: String,
    /// First message of every conversation.
    pub system_prompt: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://loreal-chatbot.audreycruz.workers.dev/".into(),
            model: "gpt-4o".into(),
            system_prompt: "You are a helpful assistant for L’Oréal. Only answer questions \
                 related to L’Oréal products, beauty routines, skincare, haircare, makeup, \
                 and product recommendations. If a question is not about L’Oréal or beauty \
                 routines, politely explain that you can only help with L’Oréal products \
                 and routines."
                .into(),
        }
    }
}

/// Where the product data file lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Local path or http(s) URL of the `{ "products": [...] }` file.
    pub source: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: "data/products.json".into(),
        }
    }
}

/// Persistent key-value storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage file. None resolves to data_dir/storage.json at runtime.
    pub path: Option<PathBuf>,
    /// Key the selected product names are stored under.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: SELECTION_KEY.into(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::data_dir().join("storage.json"))
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Directory served under /static (stylesheet, product images).
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            static_dir: PathBuf::from("static"),
        }
    }
}
