use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use crate::backends::ClientContext;
use crate::constants::{DEFAULT_MAX_CONCURRENT_BACKENDS, DEFAULT_PAGE_SIZE};
use crate::models::{ClientId, ClientType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub clients: Vec<ClientConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Items requested per backend page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Backends enumerated at the same time.
    #[serde(default = "default_max_concurrent_backends")]
    pub max_concurrent_backends: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives; `RUST_LOG` takes precedence.
    #[serde(default = "default_filter")]
    pub filter: String,
}

/// One configured backend instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub id: ClientId,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    #[serde(default)]
    pub name: String,
    pub base_url: Url,
}

impl ClientConfig {
    pub fn context(&self) -> ClientContext {
        ClientContext::new(self.id, self.client_type, self.base_url.clone())
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&contents)?;
        info!(clients = config.clients.len(), "Config loaded successfully");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.sync.page_size == 0 {
            bail!("sync.page_size must be greater than zero");
        }
        if self.sync.max_concurrent_backends == 0 {
            bail!("sync.max_concurrent_backends must be greater than zero");
        }

        let mut seen = HashSet::new();
        for client in &self.clients {
            if client.id.is_unset() {
                bail!("client {:?} has id 0, which is reserved", client.name);
            }
            if !seen.insert(client.id) {
                bail!("client id {} is configured more than once", client.id);
            }
        }
        Ok(())
    }

    pub fn client(&self, id: ClientId) -> Option<&ClientConfig> {
        self.clients.iter().find(|client| client.id == id)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("reelhub").join("config.toml"))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_concurrent_backends: default_max_concurrent_backends(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_max_concurrent_backends() -> usize {
    DEFAULT_MAX_CONCURRENT_BACKENDS
}
fn default_filter() -> String {
    "reelhub=info".to_string()
}
