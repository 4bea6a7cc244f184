//! Exchange configuration.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Static settings for a single exchange. Live values (orderbooks, fees for
/// exotic pairs, balances) come from the gateway; these are the user-set
/// parts.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Whether this exchange should be used.
    #[serde(default)]
    pub enabled: bool,
    /// API key (loaded from environment variable).
    #[serde(skip)]
    pub api_key: String,
    /// API secret (loaded from environment variable).
    #[serde(skip)]
    pub api_secret: String,
    /// Trading fee as a decimal (e.g., "0.001" for 0.1%).
    pub fee: Option<Decimal>,
    /// Per-coin caps on automatically traded volume.
    #[serde(default)]
    pub auto_trading_limits: HashMap<String, Decimal>,
}
