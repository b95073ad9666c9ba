//! Service configuration: TOML file, environment overrides and validation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DigestError, Result};
use crate::llm::{LLMConfig, LLMProvider};

/// Config file locations searched when no explicit path is given
const CONFIG_PATHS: &[&str] = &["podcast-digest.toml", "config/podcast-digest.toml"];

/// Configuration for the podcast digest service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Completion service settings
    pub llm: LLMConfig,

    /// oEmbed metadata lookup settings
    pub metadata: MetadataConfig,

    /// Record storage settings
    pub storage: StorageConfig,

    /// Bearer tokens accepted by the API
    pub auth: AuthConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// oEmbed endpoint; the video link is passed as the `url` query parameter
    pub oembed_endpoint: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            oembed_endpoint: "https://www.youtube.com/oembed".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per record
    pub records_dir: PathBuf,

    /// Attempts at drawing a fresh slug suffix when a slug is taken
    pub slug_attempts: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            records_dir: PathBuf::from("./data/podcasts"),
            slug_attempts: 3,
        }
    }
}

/// A bearer token and the user it authenticates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "podcast_digest=info,tower_http=info,warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the default locations, or
    /// built-in defaults, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_locations(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&config_str).map_err(|e| {
            DigestError::Configuration(format!("failed to parse {}: {}", path.display(), e))
        })?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    fn from_default_locations() -> Self {
        for path in CONFIG_PATHS {
            let path = Path::new(path);
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Skipping config file {}: {}", path.display(), e),
            }
        }

        tracing::info!("No config file found, using defaults");
        Self::default()
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("PODCAST_DIGEST_API_KEY") {
            self.llm.api_key = Some(api_key);
        } else if self.llm.api_key.is_none() {
            let provider_key = match self.llm.provider {
                LLMProvider::Perplexity => std::env::var("PERPLEXITY_API_KEY").ok(),
                LLMProvider::OpenAI => std::env::var("OPENAI_API_KEY").ok(),
                LLMProvider::LMStudio => None,
            };
            self.llm.api_key = provider_key;
        }

        if let Ok(model) = std::env::var("PODCAST_DIGEST_MODEL") {
            self.llm.model = model;
        }

        if let Ok(port) = std::env::var("PODCAST_DIGEST_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PODCAST_DIGEST_PORT: {}", port),
            }
        }

        if let Ok(dir) = std::env::var("PODCAST_DIGEST_RECORDS_DIR") {
            self.storage.records_dir = PathBuf::from(dir);
        }

        if let Ok(level) = std::env::var("PODCAST_DIGEST_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| DigestError::Configuration(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.llm.model.trim().is_empty() {
            return Err(DigestError::Configuration("llm.model must not be empty".to_string()));
        }

        if self.llm.timeout_seconds == 0 {
            return Err(DigestError::Configuration(
                "llm.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DigestError::Configuration(
                "llm.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.storage.slug_attempts == 0 {
            return Err(DigestError::Configuration(
                "storage.slug_attempts must be greater than 0".to_string(),
            ));
        }

        if self
            .auth
            .tokens
            .iter()
            .any(|t| t.token.trim().is_empty() || t.user_id.trim().is_empty())
        {
            return Err(DigestError::Configuration(
                "auth tokens need a non-empty token and user_id".to_string(),
            ));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Podcast Digest Configuration:\n\
            - Listen: {}:{}\n\
            - Provider: {:?} ({})\n\
            - API key: {}\n\
            - Records: {}\n\
            - Auth tokens: {}",
            self.server.host,
            self.server.port,
            self.llm.provider,
            self.llm.model,
            if self.llm.api_key.is_some() { "set" } else { "missing" },
            self.storage.records_dir.display(),
            self.auth.tokens.len()
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm = LLMConfig::for_provider(provider);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.llm.api_key = Some(api_key.into());
        self
    }

    pub fn with_records_dir(mut self, dir: PathBuf) -> Self {
        self.config.storage.records_dir = dir;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.config.auth.tokens.push(TokenEntry {
            token: token.into(),
            user_id: user_id.into(),
            email: None,
        });
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
