//! Configuration loading and validation for the fishing bot.
//!
//! Uses serde_yaml to load YAML configuration files with support for
//! environment variable overrides for sensitive credentials.

mod app;
mod duration;
mod error;
mod exchange;
mod fishing;

pub use app::AppConfig;
pub use error::ConfigError;
pub use exchange::ExchangeConfig;
pub use fishing::FishingConfig;

use serde::Deserialize;
use std::{collections::HashMap, env, fs};

/// Root configuration structure for the fishing bot.
///
/// Required sections: app, exchanges, fishing.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Maps exchange names to their configurations.
    pub exchanges: HashMap<String, ExchangeConfig>,
    /// Fishing instances to run.
    pub fishing: Vec<FishingConfig>,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// First loads environment variables from `.env` file (if exists),
    /// then loads YAML config and credentials from environment variables:
    /// `{EXCHANGE}_API_KEY`, `{EXCHANGE}_API_SECRET`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore error if not found)
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.load_credentials_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load credentials from environment variables.
    fn load_credentials_from_env(&mut self) {
        for (name, exchange) in self.exchanges.iter_mut() {
            if !exchange.enabled {
                continue;
            }

            let env_prefix = name.to_uppercase();
            exchange.api_key = env::var(format!("{}_API_KEY", env_prefix)).unwrap_or_default();
            exchange.api_secret =
                env::var(format!("{}_API_SECRET", env_prefix)).unwrap_or_default();
        }
    }

    /// Validate referential integrity of the configuration. Per-instance
    /// strategy validity (directions, offset) is surfaced through
    /// [`FishingConfig::invalid_reason`] at activation instead, so one bad
    /// instance does not block the rest.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        if self.fishing.is_empty() {
            return Err(ConfigError::Validation(
                "at least one fishing instance is required".into(),
            ));
        }

        let is_production = !self.app.is_development();

        for (name, exchange) in &self.exchanges {
            if !exchange.enabled {
                continue;
            }
            if exchange.fee.is_none() {
                return Err(ConfigError::Validation(format!(
                    "exchange {}: fee is required",
                    name
                )));
            }
            // Only require credentials in production/staging
            if is_production && (exchange.api_key.is_empty() || exchange.api_secret.is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "exchange {}: API credentials not found (set {}_API_KEY and {}_API_SECRET env vars)",
                    name,
                    name.to_uppercase(),
                    name.to_uppercase()
                )));
            }
        }

        for instance in &self.fishing {
            for exchange_name in [&instance.reference_exchange, &instance.target_exchange] {
                match self.exchanges.get(exchange_name) {
                    Some(exchange) if exchange.enabled => {}
                    Some(_) => {
                        return Err(ConfigError::Validation(format!(
                            "fishing instance {}: exchange {} is disabled",
                            instance.pair, exchange_name
                        )));
                    }
                    None => {
                        return Err(ConfigError::Validation(format!(
                            "fishing instance {}: unknown exchange {}",
                            instance.pair, exchange_name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
