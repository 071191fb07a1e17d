use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::responder::ThinkingDelay;

/// Upper bound for either part of the thinking delay (ten minutes)
pub const MAX_THINK_MS: u64 = 600_000;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding persisted conversations and the TUI log
    pub data_dir: PathBuf,

    /// Directory exported transcripts are written to
    pub export_dir: PathBuf,

    /// Namespace key the conversation list is stored under
    pub storage_key: String,

    /// Fixed part of the simulated thinking delay
    pub think_base_ms: u64,

    /// Upper bound of the random part of the thinking delay
    pub think_jitter_ms: u64,

    /// Seed for reply selection; random when unset
    pub seed: Option<u64>,

    /// TUI redraw interval
    pub tick_rate_ms: u64,
}

/// A configuration file; every field is optional and overrides the defaults
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub storage_key: Option<String>,
    pub think_base_ms: Option<u64>,
    pub think_jitter_ms: Option<u64>,
    pub seed: Option<u64>,
    pub tick_rate_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs::data_dir()
                .map(|dir| dir.join("zed-ai"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            export_dir: dirs::download_dir()
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from(".")),
            storage_key: "zed_conversations".to_string(),
            think_base_ms: 1000,
            think_jitter_ms: 2000,
            seed: None,
            tick_rate_ms: 100,
        }
    }
}

impl Config {
    /// Initialize configuration from defaults, config files and the environment
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = Self::default();

        // Try to load from configuration files
        if let Some(file_config) = Self::load_from_file().await? {
            config.merge_with(file_config);
        }

        // Environment wins over files
        config.load_from_env(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Apply `ZED_AI_*` overrides. `lookup` abstracts the environment for tests.
    pub fn load_from_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = lookup("ZED_AI_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }

        if let Some(export_dir) = lookup("ZED_AI_EXPORT_DIR") {
            self.export_dir = PathBuf::from(export_dir);
        }

        if let Some(key) = lookup("ZED_AI_STORAGE_KEY") {
            self.storage_key = key;
        }

        if let Some(base) = lookup("ZED_AI_THINK_BASE_MS").and_then(|v| v.parse().ok()) {
            self.think_base_ms = base;
        }

        if let Some(jitter) = lookup("ZED_AI_THINK_JITTER_MS").and_then(|v| v.parse().ok()) {
            self.think_jitter_ms = jitter;
        }

        if let Some(seed) = lookup("ZED_AI_SEED").and_then(|v| v.parse().ok()) {
            self.seed = Some(seed);
        }
    }

    /// Load the first configuration file found:
    /// 1. ./.zed-ai.json
    /// 2. ./zed-ai.json
    /// 3. $CONFIG_DIR/zed-ai/zed-ai.json
    pub async fn load_from_file() -> Result<Option<FileConfig>> {
        let mut config_paths = vec![
            PathBuf::from("./.zed-ai.json"),
            PathBuf::from("./zed-ai.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("zed-ai").join("zed-ai.json"));
        }

        for path in config_paths {
            if path.exists() {
                debug!("Loading configuration from: {}", path.display());
                let content = tokio::fs::read_to_string(&path).await?;
                let config: FileConfig = serde_json::from_str(&content)
                    .with_context(|| format!("Invalid configuration file {}", path.display()))?;
                return Ok(Some(config));
            }
        }

        Ok(None)
    }

    /// Merge a configuration file into this one
    pub fn merge_with(&mut self, other: FileConfig) {
        if let Some(data_dir) = other.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(export_dir) = other.export_dir {
            self.export_dir = export_dir;
        }
        if let Some(storage_key) = other.storage_key {
            self.storage_key = storage_key;
        }
        if let Some(base) = other.think_base_ms {
            self.think_base_ms = base;
        }
        if let Some(jitter) = other.think_jitter_ms {
            self.think_jitter_ms = jitter;
        }
        if other.seed.is_some() {
            self.seed = other.seed;
        }
        if let Some(tick) = other.tick_rate_ms {
            self.tick_rate_ms = tick;
        }
    }

    pub fn thinking_delay(&self) -> ThinkingDelay {
        ThinkingDelay::from_millis(self.think_base_ms, self.think_jitter_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(anyhow::anyhow!("storage_key must not be empty"));
        }

        if self.tick_rate_ms == 0 {
            return Err(anyhow::anyhow!("tick_rate_ms must be greater than 0"));
        }

        if self.think_base_ms > MAX_THINK_MS || self.think_jitter_ms > MAX_THINK_MS {
            return Err(anyhow::anyhow!(
                "think_base_ms and think_jitter_ms must not exceed {} ms",
                MAX_THINK_MS
            ));
        }

        Ok(())
    }
}
