//! Server configuration parsing from environment variables.

use super::parse_env;
use super::training_config::DEFAULT_ARTIFACT_PATH;
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server environment configuration
#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub host: String,
    pub port: u16,
    pub artifact_path: PathBuf,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT", defaults.port)?,
            artifact_path: env::var("ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifact_path),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid HOST:PORT configuration {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerEnvConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..ServerEnvConfig::default()
        };
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_invalid_host_rejected() {
        let config = ServerEnvConfig {
            host: "not a host".to_string(),
            ..ServerEnvConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
