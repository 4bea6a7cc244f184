//! Exchange gateway contract consumed by the fishing core.
//!
//! Connector implementations live in the host platform; this crate only
//! defines the contract and the balance-reservation bookkeeping they share.

mod reservation;

#[cfg(test)]
pub(crate) mod mock;

use crate::domain::{CompletedTrade, Order, Orderbook, Trade};
use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

pub use reservation::{HoldToken, ReservationLedger};

/// Exchange errors.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Trading pair is not supported by this exchange.
    #[error("pair {0} is not supported")]
    PairNotSupported(String),

    /// Insufficient funds for the operation.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Order not found.
    #[error("order {0} not found")]
    OrderNotFound(u64),

    /// The operation was cancelled mid-flight, e.g. by deactivation.
    /// Pollers treat this as "do nothing this tick, retry later".
    #[error("operation cancelled")]
    Cancelled,

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// API error from the exchange.
    #[error("API error: {0}")]
    Api(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for exchange operations.
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// ExchangeGateway is the narrow contract the fishing core consumes per
/// exchange. All async methods poll already-fetched connector state; none of
/// them may block on the network inside a tick.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// Unique identifier of this exchange (e.g., "binance", "poloniex").
    fn name(&self) -> &str;

    /// Whether the exchange lists the pair ("BASE/QUOTE" format).
    fn has_pair(&self, pair: &str) -> bool;

    /// Whether the pair is synthetic/pass-through (routed through another
    /// pair rather than a real market). Fishing such pairs is rejected at
    /// activation.
    fn pair_is_synthetic(&self, pair: &str) -> bool;

    /// Base and quote currency symbols of the pair as the exchange reports
    /// them. Returns `PairNotSupported` for unknown pairs.
    fn pair_currencies(&self, pair: &str) -> Result<(String, String)>;

    /// Trading fee for the pair as a decimal (e.g., 0.001 for 0.1%).
    fn fee(&self, pair: &str) -> Decimal;

    /// User-configured volume cap for automatic trading of a coin, if set.
    fn auto_trading_limit(&self, coin: &str) -> Option<Decimal>;

    /// Whether the exchange's trade history reliably reports fills. When
    /// false, a vanished order cannot be confirmed and is assumed filled.
    fn trade_history_is_trustworthy(&self) -> bool;

    /// Current orderbook snapshot for a trading pair.
    async fn orderbook(&self, pair: &str) -> Result<Orderbook>;

    /// The resting order with this id, or `None` once it is no longer on
    /// the book (filled, cancelled or expired).
    async fn order(&self, order_id: u64) -> Result<Option<Order>>;

    /// Trade-history record for an order, or `None` when no fill is known.
    async fn completed_trade(&self, order_id: u64) -> Result<Option<CompletedTrade>>;

    /// Submits a limit order for the trade. Returns the exchange order id.
    async fn create_order(&self, trade: &Trade) -> Result<u64>;

    /// Cancels a resting order. Returns `OrderNotFound` when the order is
    /// already off the book.
    async fn cancel_order(&self, pair: &str, order_id: u64) -> Result<()>;

    /// Balance of `coin` in `fund` that is not locked by holds.
    async fn available(&self, fund: &str, coin: &str) -> Result<Decimal>;

    /// Places an exclusive hold on `amount` of a coin's balance. The token
    /// must be released exactly once; consuming it by value enforces that.
    fn hold(&self, fund: &str, coin: &str, amount: Decimal) -> Result<HoldToken>;

    /// Releases a hold. Idempotence is structural: the token cannot be used
    /// twice because `release` takes it by value.
    fn release(&self, token: HoldToken);
}
