use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub pipeline: PipelineSection,
    pub encoder: EncoderConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineSection {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EncoderConfig {
    /// Strings per model invocation. Must be at least 1.
    pub batch_size: usize,
    /// Where the `.npy` matrix is written. Relative paths resolve against
    /// the working directory.
    pub output_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
    /// Token pooling strategy: "mean" or "cls".
    pub pooling: String,
    /// "cpu", or "cuda" when built with the `cuda` feature. A cuda request
    /// on a cpu-only build falls back to cpu with a warning.
    pub device: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineSection::default(),
            encoder: EncoderConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            output_path: "data/encoded_vectors.npy".into(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_app_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
            pooling: "mean".into(),
            device: "cpu".into(),
        }
    }
}

/// Returns `~/.tweet-embed/`
pub fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".tweet-embed")
}

/// Returns the default config file path: `~/.tweet-embed/config.toml`
pub fn default_config_path() -> PathBuf {
    default_app_dir().join("config.toml")
}

impl PipelineConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            PipelineConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (TWEET_EMBED_LOG_LEVEL,
    /// TWEET_EMBED_OUTPUT, TWEET_EMBED_BATCH_SIZE).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TWEET_EMBED_LOG_LEVEL") {
            self.pipeline.log_level = val;
        }
        if let Ok(val) = std::env::var("TWEET_EMBED_OUTPUT") {
            self.encoder.output_path = val;
        }
        if let Ok(val) = std::env::var("TWEET_EMBED_BATCH_SIZE") {
            if let Ok(n) = val.parse() {
                self.encoder.batch_size = n;
            }
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
