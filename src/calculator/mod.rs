//! Pure trade derivation functions.
//!
//! Everything here is stateless: callers pass in already-fetched orderbook
//! snapshots and get back immutable [`Trade`] values. No gateway access, so
//! the whole pricing logic is testable without a live exchange.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{Direction, Orderbook, Trade};

/// Verdict of pre-submission trade validation. Invalidity is an expected
/// outcome, not an error: it blocks order placement and gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeVerdict {
    /// Trade can be submitted.
    Valid,
    /// Derived rate is zero, typically from an empty orderbook.
    ZeroPrice,
    /// Input or nett output volume is zero or negative.
    ZeroVolume,
    /// Input volume exceeds the balance held for the trade.
    InsufficientFunds,
}

impl std::fmt::Display for TradeVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeVerdict::Valid => write!(f, "valid"),
            TradeVerdict::ZeroPrice => write!(f, "zero price"),
            TradeVerdict::ZeroVolume => write!(f, "zero volume"),
            TradeVerdict::InsufficientFunds => write!(f, "insufficient funds"),
        }
    }
}

/// Walks the opposing side of the orderbook to determine the rate and nett
/// volume achievable for trading `volume_available` of the input currency.
///
/// The reported rate is that of the deepest level consumed, i.e. the limit
/// price at which the whole volume clears in one shot. An empty or exhausted
/// book yields a zero-rate, zero-volume trade the caller must detect via
/// [`validate`].
pub fn derive_trade(
    fund: &str,
    book: &Orderbook,
    direction: Direction,
    fee: Decimal,
    volume_available: Decimal,
) -> Trade {
    let mut remaining = volume_available.max(Decimal::ZERO);
    let mut volume_out = Decimal::ZERO;
    let mut last_rate = Decimal::ZERO;
    let mut depth = 0usize;

    for level in book.side(direction) {
        if remaining <= Decimal::ZERO {
            break;
        }
        if level.price <= Decimal::ZERO || level.quantity <= Decimal::ZERO {
            continue;
        }
        // Capacity and rate in input-currency terms.
        let (capacity, rate) = match direction {
            Direction::BaseToQuote => (level.quantity, level.price),
            Direction::QuoteToBase => {
                (level.price * level.quantity, Decimal::ONE / level.price)
            }
        };
        let take = remaining.min(capacity);
        volume_out += take * rate;
        remaining -= take;
        last_rate = rate;
        depth += 1;
    }

    let volume_in = volume_available.max(Decimal::ZERO) - remaining;
    Trade {
        fund: fund.to_string(),
        direction,
        pair: book.pair.clone(),
        price: last_rate,
        volume_in,
        volume_out,
        nett_volume: volume_out * (Decimal::ONE - fee),
        depth,
    }
}

/// Derives the resting rate for a bait order from the reference-exchange
/// match trade and the live market trade on the target exchange.
///
/// Rests at the live market rate whenever that already clears the minimum
/// profitable offset over the match trade's inverse rate; otherwise rests at
/// one and a half times the offset, biasing slightly better than the minimum
/// without chasing an unprofitable market.
pub fn derive_bait_price(match_trade: &Trade, market_trade: &Trade, offset: Decimal) -> Decimal {
    let break_even = match_trade.inverse_price();
    let minimum = break_even * (Decimal::ONE + offset);
    if market_trade.price >= minimum {
        market_trade.price.max(minimum)
    } else {
        break_even * (Decimal::ONE + dec!(1.5) * offset)
    }
}

/// Validates a trade before submission. `held` is the reserved balance
/// backing the trade's input volume, when one exists.
pub fn validate(trade: &Trade, held: Option<Decimal>) -> TradeVerdict {
    if trade.price <= Decimal::ZERO {
        return TradeVerdict::ZeroPrice;
    }
    if trade.volume_in <= Decimal::ZERO || trade.nett_volume <= Decimal::ZERO {
        return TradeVerdict::ZeroVolume;
    }
    if let Some(held) = held {
        if trade.volume_in > held {
            return TradeVerdict::InsufficientFunds;
        }
    }
    TradeVerdict::Valid
}

/// Counts how many opposing-book levels are priced better than a bait order
/// resting at `rate`, i.e. how deep the bait sits in the queue.
pub fn depth_of_rate(book: &Orderbook, bait_direction: Direction, rate: Decimal) -> usize {
    if rate <= Decimal::ZERO {
        return 0;
    }
    match bait_direction {
        // A selling bait rests among asks; asks below its price fill first.
        Direction::BaseToQuote => book.asks.iter().take_while(|l| l.price < rate).count(),
        // A buying bait rests among bids; bids above its native price fill first.
        Direction::QuoteToBase => {
            let native = Decimal::ONE / rate;
            book.bids.iter().take_while(|l| l.price > native).count()
        }
    }
}
