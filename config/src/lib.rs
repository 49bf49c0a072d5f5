use anyhow::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("models"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

/// Values used for every model parameter the user leaves unset.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelDefaults {
    pub learning_rate: f64,
    pub loss: String,
    pub epochs: usize,
    pub no_components: usize,
    pub random_state: u64,
    pub max_sampled: usize,
    pub n_recommendations: usize,
}

impl Default for ModelDefaults {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            loss: "warp".into(),
            epochs: 10,
            no_components: 10,
            random_state: 42,
            max_sampled: 10,
            n_recommendations: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub log: LogConfig,
    pub defaults: ModelDefaults,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        let parsed: Self = toml::from_str(&contents)?;
        Ok(parsed)
    }
}
