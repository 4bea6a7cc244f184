//! Resting orders and completed trade records as observed on an exchange.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order represents a limit order currently resting on an exchange.
///
/// Volumes are expressed in the input currency of the trade that created the
/// order, matching [`super::Trade`] conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier assigned by the exchange.
    pub id: u64,
    /// Trading pair in "BASE/QUOTE" format (e.g., "BTC/USDT").
    pub pair: String,
    /// Limit price as a conversion rate (output units per input unit).
    pub price: Decimal,
    /// Original input-currency volume of the order.
    pub quantity: Decimal,
    /// Input-currency volume not yet filled.
    pub remaining: Decimal,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Fraction of the order filled so far, in [0, 1].
    pub fn filled_fraction(&self) -> Decimal {
        if self.quantity <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let f = Decimal::ONE - self.remaining / self.quantity;
        f.clamp(Decimal::ZERO, Decimal::ONE)
    }
}

/// CompletedTrade is an exchange trade-history record for a filled order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTrade {
    /// ID of the order that produced this fill.
    pub order_id: u64,
    /// Trading pair in "BASE/QUOTE" format.
    pub pair: String,
    /// Execution rate (output units per input unit).
    pub price: Decimal,
    /// Input-currency volume filled.
    pub volume_in: Decimal,
    /// Output-currency volume received, after fees.
    pub volume_out: Decimal,
    /// When the fill was recorded.
    pub timestamp: DateTime<Utc>,
}
