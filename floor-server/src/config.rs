use anyhow::Result;
use floor_core::models::{DEFAULT_HISTORY_LEN, DEFAULT_STARTING_BALANCE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Prefix of environment variables that override file and default settings,
/// e.g. `FLOOR_PORT=8080`.
pub const ENV_PREFIX: &str = "FLOOR";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,

    // Session
    pub tick_interval_ms: u64,
    pub starting_balance: f64,
    pub history_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            log_level: "info".to_string(),

            tick_interval_ms: 2000,
            starting_balance: DEFAULT_STARTING_BALANCE,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl ServerConfig {
    /// Layers built-in defaults, the optional config file and `FLOOR_*`
    /// environment variables, in that order.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        // Keys missing from every source fall back to `Default` via `#[serde(default)]`.
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would break session invariants from the start.
    pub fn validate(&self) -> Result<()> {
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            anyhow::bail!(
                "starting_balance must be a non-negative number, got {}",
                self.starting_balance
            );
        }
        if self.history_len == 0 {
            anyhow::bail!("history_len must be at least 1");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
