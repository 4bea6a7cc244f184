//! Exclusive balance holds keyed by move-only tokens.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Opaque handle to a balance reservation.
///
/// Deliberately neither `Clone` nor `Copy`: releasing consumes the token, so
/// a double release does not compile.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HoldToken(u64);

impl HoldToken {
    /// Numeric id, for logging.
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Reservation {
    fund: String,
    coin: String,
    amount: Decimal,
}

/// Token-keyed exclusive holds over a fund's coin balances.
///
/// Connector implementations embed one of these to back
/// [`super::ExchangeGateway::hold`] and `release`. The ledger only tracks
/// reservations; the caller supplies the gross balance when asking how much
/// is spendable.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    next_token: AtomicU64,
    holds: Mutex<HashMap<u64, Reservation>>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total amount currently held for a fund's coin.
    pub fn held(&self, fund: &str, coin: &str) -> Decimal {
        let holds = self.holds.lock().unwrap_or_else(|e| e.into_inner());
        holds
            .values()
            .filter(|r| r.fund == fund && r.coin == coin)
            .map(|r| r.amount)
            .sum()
    }

    /// Places a hold of `amount`, given the fund's gross `balance` of the
    /// coin. Returns `None` when the unheld balance does not cover it.
    pub fn hold(
        &self,
        fund: &str,
        coin: &str,
        amount: Decimal,
        balance: Decimal,
    ) -> Option<HoldToken> {
        if amount <= Decimal::ZERO {
            return None;
        }
        let mut holds = self.holds.lock().unwrap_or_else(|e| e.into_inner());
        let already_held: Decimal = holds
            .values()
            .filter(|r| r.fund == fund && r.coin == coin)
            .map(|r| r.amount)
            .sum();
        if balance - already_held < amount {
            return None;
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed) + 1;
        holds.insert(
            token,
            Reservation {
                fund: fund.to_string(),
                coin: coin.to_string(),
                amount,
            },
        );
        Some(HoldToken(token))
    }

    /// Releases a hold. An unknown token is logged, not fatal.
    pub fn release(&self, token: HoldToken) {
        let mut holds = self.holds.lock().unwrap_or_else(|e| e.into_inner());
        if holds.remove(&token.0).is_none() {
            warn!(token = token.0, "release of unknown hold token");
        }
    }
}
