//! Fishing instance configuration.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

use super::duration;
use crate::domain::split_pair;

/// Settings for one fishing instance: a pair worked across a reference and
/// a target exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct FishingConfig {
    /// Trading pair in "BASE/QUOTE" format (e.g., "BTC/USDT").
    pub pair: String,
    /// Exchange the match order executes on.
    pub reference_exchange: String,
    /// Exchange the bait order rests on.
    pub target_exchange: String,
    /// Fund partitioning balances for this instance (default: "default").
    #[serde(default = "default_fund")]
    pub fund: String,
    /// Minimum fractional price advantage of the bait over the reference
    /// price. Must exceed the combined exchange fees to be profitable.
    pub price_offset: Decimal,
    /// Fish the Base→Quote direction.
    #[serde(default)]
    pub base_to_quote: bool,
    /// Fish the Quote→Base direction.
    #[serde(default)]
    pub quote_to_base: bool,
    /// Interval between ticks (default: 500ms).
    #[serde(default, with = "duration")]
    pub tick_interval: Duration,
}

fn default_fund() -> String {
    "default".to_string()
}

impl FishingConfig {
    /// Tick interval with the 500ms default applied.
    pub fn tick_interval(&self) -> Duration {
        if self.tick_interval.is_zero() {
            Duration::from_millis(500)
        } else {
            self.tick_interval
        }
    }

    /// Whether the configuration satisfies the activation invariant.
    pub fn valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    /// Human-readable reason the configuration is invalid, if it is.
    pub fn invalid_reason(&self) -> Option<String> {
        if split_pair(&self.pair).is_none() {
            return Some(format!("pair {:?} is not in BASE/QUOTE format", self.pair));
        }
        if self.reference_exchange.is_empty() || self.target_exchange.is_empty() {
            return Some("reference and target exchange must both be named".to_string());
        }
        if self.reference_exchange == self.target_exchange {
            return Some("reference and target exchange must differ".to_string());
        }
        if self.price_offset <= Decimal::ZERO {
            return Some("price_offset must be positive".to_string());
        }
        if !self.base_to_quote && !self.quote_to_base {
            return Some("at least one direction must be enabled".to_string());
        }
        None
    }

    /// UI-facing validity: the activation invariant plus the requirement
    /// that the offset exceeds the combined transaction fees.
    pub fn validity_with_fees(
        &self,
        reference_fee: Decimal,
        target_fee: Decimal,
    ) -> Option<String> {
        if let Some(reason) = self.invalid_reason() {
            return Some(reason);
        }
        let fees = reference_fee + target_fee;
        if self.price_offset <= fees {
            return Some(format!(
                "price_offset {} does not exceed combined fees {}",
                self.price_offset, fees
            ));
        }
        None
    }
}
