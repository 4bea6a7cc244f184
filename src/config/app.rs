//! Application-level configuration.

use serde::Deserialize;

/// Top-level application settings shared by every fishing instance.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Name used in log output.
    pub name: String,
    /// Deployment environment: "development", "staging", or "production".
    pub env: String,
    /// Logging verbosity: "debug", "info", "warn", "error".
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Development mode relaxes credential requirements.
    pub fn is_development(&self) -> bool {
        self.env == "development"
    }
}
