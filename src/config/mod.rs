//! Configuration module for trendcast.
//!
//! Structured configuration loading from environment variables, split by
//! entry point: training and serving.

mod server_config;
mod training_config;

pub use server_config::ServerEnvConfig;
pub use training_config::{
    DEFAULT_ARTIFACT_PATH, DEFAULT_DATA_PATH, DEFAULT_SEQUENCE_LENGTH, TrainingEnvConfig,
};

use anyhow::{Context, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub training: TrainingEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let training = TrainingEnvConfig::from_env().context("Failed to load training config")?;
        let server = ServerEnvConfig::from_env().context("Failed to load server config")?;
        Ok(Self { training, server })
    }
}

/// Reads `key`, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .context(format!("Failed to parse {}", key))
}
