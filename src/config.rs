//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the legal search engine, supporting
//! TOML files and environment-variable overrides with validation and type-safe
//! access to all system settings.
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (`LEGAL_SEARCH_*`)
//! 2. Configuration file (TOML)
//! 3. Default values
//!
//! ## Usage
//! ```rust,no_run
//! use legal_semantic_search::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Corpus location settings
    pub corpus: CorpusConfig,
    /// Embedding capability configuration
    pub embedding: EmbeddingConfig,
    /// Search behavior
    pub search: SearchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable permissive CORS for web frontends
    pub enable_cors: bool,
}

/// Corpus location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Directory holding the `*.json` dataset files
    pub dataset_dir: PathBuf,
}

/// Which embedding capability to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Remote embedding-inference endpoint (text-embeddings-inference style)
    Http,
    /// Deterministic in-process token-hashing embedder
    Hashing,
}

/// Embedding capability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider selection
    pub provider: EmbeddingProvider,
    /// Base URL of the remote embedding endpoint (http provider)
    pub endpoint: String,
    /// Model identifier reported in stats
    pub model_name: String,
    /// Embedding vector width; must match the model output
    pub dimension: usize,
    /// Request timeout for the remote endpoint in seconds
    pub request_timeout_seconds: u64,
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default number of results when the request does not specify one
    pub default_top_k: usize,
    /// Upper bound applied to requested result counts
    pub max_top_k: usize,
    /// Minimum query length in characters
    pub min_query_length: usize,
    /// Maximum query length in characters
    pub max_query_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| SearchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("LEGAL_SEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("LEGAL_SEARCH_PORT") {
            self.server.port = port.parse().map_err(|_| SearchError::Config {
                message: "Invalid port number in LEGAL_SEARCH_PORT".to_string(),
            })?;
        }
        if let Ok(dataset_dir) = std::env::var("LEGAL_SEARCH_DATASET_DIR") {
            self.corpus.dataset_dir = PathBuf::from(dataset_dir);
        }
        if let Ok(endpoint) = std::env::var("LEGAL_SEARCH_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = endpoint;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(SearchError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.embedding.dimension == 0 {
            return Err(SearchError::ValidationFailed {
                field: "embedding.dimension".to_string(),
                reason: "Embedding dimension must be greater than zero".to_string(),
            });
        }

        if self.embedding.provider == EmbeddingProvider::Http && self.embedding.endpoint.is_empty()
        {
            return Err(SearchError::ValidationFailed {
                field: "embedding.endpoint".to_string(),
                reason: "HTTP embedding provider requires an endpoint".to_string(),
            });
        }

        if self.search.default_top_k == 0 || self.search.default_top_k > self.search.max_top_k {
            return Err(SearchError::ValidationFailed {
                field: "search.default_top_k".to_string(),
                reason: format!(
                    "default_top_k must be in 1..={}",
                    self.search.max_top_k
                ),
            });
        }

        if self.search.min_query_length > self.search.max_query_length {
            return Err(SearchError::ValidationFailed {
                field: "search.min_query_length".to_string(),
                reason: "Minimum query length cannot be greater than maximum".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            corpus: CorpusConfig::default(),
            embedding: EmbeddingConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("dataset"),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hashing,
            endpoint: "http://127.0.0.1:8081".to_string(),
            model_name: "all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_top_k: 3,
            max_top_k: 20,
            min_query_length: 1,
            max_query_length: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
