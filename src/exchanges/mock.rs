//! In-memory exchange gateway for state machine tests.

use super::{ExchangeError, ExchangeGateway, HoldToken, ReservationLedger, Result};
use crate::domain::{CompletedTrade, Order, Orderbook, PriceLevel, Trade, split_pair};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::SystemTime;

/// Scripted in-memory exchange. Tests mutate its state between ticks to
/// simulate fills, vanishing orders and collapsing books.
pub(crate) struct MockExchange {
    name: String,
    fee: Decimal,
    trustworthy: bool,
    pub synthetic: bool,
    /// Overrides `pair_currencies` when set (for mismatch tests).
    pub currencies: Mutex<Option<(String, String)>>,
    books: Mutex<HashMap<String, Orderbook>>,
    orders: Mutex<HashMap<u64, Order>>,
    history: Mutex<HashMap<u64, CompletedTrade>>,
    balances: Mutex<HashMap<(String, String), Decimal>>,
    limits: Mutex<HashMap<String, Decimal>>,
    ledger: ReservationLedger,
    next_order: AtomicU64,
    created: Mutex<Vec<Trade>>,
    cancelled: Mutex<Vec<u64>>,
    releases: AtomicUsize,
    fail_next: Mutex<Option<ExchangeError>>,
    fail_create: Mutex<Option<ExchangeError>>,
}

impl MockExchange {
    pub fn new(name: &str, fee: Decimal, trustworthy: bool) -> Self {
        Self {
            name: name.to_string(),
            fee,
            trustworthy,
            synthetic: false,
            currencies: Mutex::new(None),
            books: Mutex::new(HashMap::new()),
            orders: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            limits: Mutex::new(HashMap::new()),
            ledger: ReservationLedger::new(),
            next_order: AtomicU64::new(0),
            created: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            releases: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
            fail_create: Mutex::new(None),
        }
    }

    pub fn set_book(&self, pair: &str, bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) {
        let levels = |side: &[(Decimal, Decimal)]| {
            side.iter()
                .map(|&(price, quantity)| PriceLevel { price, quantity })
                .collect()
        };
        self.books.lock().unwrap().insert(
            pair.to_string(),
            Orderbook {
                pair: pair.to_string(),
                exchange: self.name.clone(),
                bids: levels(bids),
                asks: levels(asks),
                timestamp: SystemTime::now(),
            },
        );
    }

    pub fn set_balance(&self, fund: &str, coin: &str, amount: Decimal) {
        self.balances
            .lock()
            .unwrap()
            .insert((fund.to_string(), coin.to_string()), amount);
    }

    pub fn set_limit(&self, coin: &str, amount: Decimal) {
        self.limits.lock().unwrap().insert(coin.to_string(), amount);
    }

    /// Removes the order from the book, simulating a fill or exchange-side
    /// cancellation.
    pub fn vanish_order(&self, order_id: u64) {
        self.orders.lock().unwrap().remove(&order_id);
    }

    /// Sets the remaining volume of a resting order (partial fill).
    pub fn set_remaining(&self, order_id: u64, remaining: Decimal) {
        if let Some(order) = self.orders.lock().unwrap().get_mut(&order_id) {
            order.remaining = remaining;
        }
    }

    /// Records a trade-history fill for an order.
    pub fn add_history(&self, order_id: u64, volume_in: Decimal, volume_out: Decimal) {
        self.history.lock().unwrap().insert(
            order_id,
            CompletedTrade {
                order_id,
                pair: "BTC/USDT".to_string(),
                price: if volume_in > Decimal::ZERO {
                    volume_out / volume_in
                } else {
                    Decimal::ZERO
                },
                volume_in,
                volume_out,
                timestamp: Utc::now(),
            },
        );
    }

    /// Fails the next async gateway call with the given error.
    pub fn fail_next(&self, err: ExchangeError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Fails the next `create_order` call, leaving reads untouched.
    pub fn fail_create(&self, err: ExchangeError) {
        *self.fail_create.lock().unwrap() = Some(err);
    }

    pub fn created_orders(&self) -> Vec<Trade> {
        self.created.lock().unwrap().clone()
    }

    pub fn cancelled_orders(&self) -> Vec<u64> {
        self.cancelled.lock().unwrap().clone()
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    pub fn has_order(&self, order_id: u64) -> bool {
        self.orders.lock().unwrap().contains_key(&order_id)
    }

    fn take_failure(&self) -> Result<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExchangeGateway for MockExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_pair(&self, pair: &str) -> bool {
        self.books.lock().unwrap().contains_key(pair)
    }

    fn pair_is_synthetic(&self, _pair: &str) -> bool {
        self.synthetic
    }

    fn pair_currencies(&self, pair: &str) -> Result<(String, String)> {
        if let Some(overridden) = self.currencies.lock().unwrap().clone() {
            return Ok(overridden);
        }
        match split_pair(pair) {
            Some((base, quote)) => Ok((base.to_string(), quote.to_string())),
            None => Err(ExchangeError::PairNotSupported(pair.to_string())),
        }
    }

    fn fee(&self, _pair: &str) -> Decimal {
        self.fee
    }

    fn auto_trading_limit(&self, coin: &str) -> Option<Decimal> {
        self.limits.lock().unwrap().get(coin).copied()
    }

    fn trade_history_is_trustworthy(&self) -> bool {
        self.trustworthy
    }

    async fn orderbook(&self, pair: &str) -> Result<Orderbook> {
        self.take_failure()?;
        self.books
            .lock()
            .unwrap()
            .get(pair)
            .cloned()
            .ok_or_else(|| ExchangeError::PairNotSupported(pair.to_string()))
    }

    async fn order(&self, order_id: u64) -> Result<Option<Order>> {
        self.take_failure()?;
        Ok(self.orders.lock().unwrap().get(&order_id).cloned())
    }

    async fn completed_trade(&self, order_id: u64) -> Result<Option<CompletedTrade>> {
        self.take_failure()?;
        Ok(self.history.lock().unwrap().get(&order_id).cloned())
    }

    async fn create_order(&self, trade: &Trade) -> Result<u64> {
        self.take_failure()?;
        if let Some(err) = self.fail_create.lock().unwrap().take() {
            return Err(err);
        }
        let id = self.next_order.fetch_add(1, Ordering::Relaxed) + 1;
        self.orders.lock().unwrap().insert(
            id,
            Order {
                id,
                pair: trade.pair.clone(),
                price: trade.price,
                quantity: trade.volume_in,
                remaining: trade.volume_in,
                created_at: Utc::now(),
            },
        );
        self.created.lock().unwrap().push(trade.clone());
        Ok(id)
    }

    async fn cancel_order(&self, _pair: &str, order_id: u64) -> Result<()> {
        self.take_failure()?;
        self.cancelled.lock().unwrap().push(order_id);
        match self.orders.lock().unwrap().remove(&order_id) {
            Some(_) => Ok(()),
            None => Err(ExchangeError::OrderNotFound(order_id)),
        }
    }

    async fn available(&self, fund: &str, coin: &str) -> Result<Decimal> {
        self.take_failure()?;
        let balance = self
            .balances
            .lock()
            .unwrap()
            .get(&(fund.to_string(), coin.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO);
        Ok(balance - self.ledger.held(fund, coin))
    }

    fn hold(&self, fund: &str, coin: &str, amount: Decimal) -> Result<HoldToken> {
        let balance = self
            .balances
            .lock()
            .unwrap()
            .get(&(fund.to_string(), coin.to_string()))
            .copied()
            .unwrap_or(Decimal::ZERO);
        self.ledger
            .hold(fund, coin, amount, balance)
            .ok_or(ExchangeError::InsufficientFunds)
    }

    fn release(&self, token: HoldToken) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        self.ledger.release(token);
    }
}
