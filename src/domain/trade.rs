//! Trade value type and trade direction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a conversion on a "BASE/QUOTE" pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Sell base currency for quote currency.
    BaseToQuote,
    /// Buy base currency with quote currency.
    QuoteToBase,
}

impl Direction {
    /// The inverse conversion.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::BaseToQuote => Direction::QuoteToBase,
            Direction::QuoteToBase => Direction::BaseToQuote,
        }
    }

    /// Currency spent by a trade in this direction.
    pub fn input_coin<'a>(self, base: &'a str, quote: &'a str) -> &'a str {
        match self {
            Direction::BaseToQuote => base,
            Direction::QuoteToBase => quote,
        }
    }

    /// Currency received by a trade in this direction.
    pub fn output_coin<'a>(self, base: &'a str, quote: &'a str) -> &'a str {
        match self {
            Direction::BaseToQuote => quote,
            Direction::QuoteToBase => base,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::BaseToQuote => write!(f, "base_to_quote"),
            Direction::QuoteToBase => write!(f, "quote_to_base"),
        }
    }
}

/// Trade is an immutable description of an achievable conversion.
///
/// Prices are conversion rates (output units per input unit) regardless of
/// direction, so "a higher rate is better" holds for both directions. A rate
/// of zero marks a trade derived from an empty or exhausted orderbook;
/// callers must detect this through [`crate::calculator::validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Fund the trade draws its balance from.
    pub fund: String,
    /// Conversion direction.
    pub direction: Direction,
    /// Trading pair in "BASE/QUOTE" format.
    pub pair: String,
    /// Conversion rate, output units per input unit, before fees.
    pub price: Decimal,
    /// Input-currency volume consumed.
    pub volume_in: Decimal,
    /// Gross output volume at the achieved rates, before fees.
    pub volume_out: Decimal,
    /// Output volume after the exchange fee.
    pub nett_volume: Decimal,
    /// Number of opposing orderbook levels consumed to reach `price`.
    pub depth: usize,
}

impl Trade {
    /// Builds a trade from an explicit limit rate, as used for the resting
    /// bait order: the whole volume converts at `price`.
    pub fn from_price(
        fund: &str,
        direction: Direction,
        pair: &str,
        price: Decimal,
        volume_in: Decimal,
        fee: Decimal,
        depth: usize,
    ) -> Trade {
        let volume_out = volume_in * price;
        Trade {
            fund: fund.to_string(),
            direction,
            pair: pair.to_string(),
            price,
            volume_in,
            volume_out,
            nett_volume: volume_out * (Decimal::ONE - fee),
            depth,
        }
    }

    /// The rate of the inverse conversion, or zero when `price` is zero.
    pub fn inverse_price(&self) -> Decimal {
        if self.price <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        Decimal::ONE / self.price
    }

    /// Derives a trade for `fraction` of this trade's volume. Rate and depth
    /// are unchanged; all volumes scale linearly.
    pub fn partial(&self, fraction: Decimal) -> Trade {
        Trade {
            fund: self.fund.clone(),
            direction: self.direction,
            pair: self.pair.clone(),
            price: self.price,
            volume_in: self.volume_in * fraction,
            volume_out: self.volume_out * fraction,
            nett_volume: self.nett_volume * fraction,
            depth: self.depth,
        }
    }
}

/// Splits a "BASE/QUOTE" pair name into its currency symbols.
pub(crate) fn split_pair(pair: &str) -> Option<(&str, &str)> {
    let (base, quote) = pair.split_once('/')?;
    if base.is_empty() || quote.is_empty() {
        return None;
    }
    Some((base, quote))
}
