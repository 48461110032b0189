//! Server configuration

use riskguard_sdk::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Log level
    pub log_level: String,

    /// Fraud pattern YAML loaded at startup (optional)
    pub patterns_file: Option<PathBuf>,

    /// Seconds between escalation rescans; 0 disables the background task
    pub escalation_interval_secs: u64,

    /// Engine settings
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            patterns_file: None,
            escalation_interval_secs: 300,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();
        Self::load_from("config/server")
    }

    /// Load from `path` (any extension the `config` crate knows) plus
    /// `RISKGUARD__*` environment variables
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config_result = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("RISKGUARD").separator("__"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::info!(error = %e, "No usable config source, using default configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn escalation_interval(&self) -> Option<Duration> {
        (self.escalation_interval_secs > 0).then(|| Duration::from_secs(self.escalation_interval_secs))
    }
}
