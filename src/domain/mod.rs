//! Domain models for the fishing strategy core.

mod order;
mod orderbook;
mod trade;

pub use order::{CompletedTrade, Order};
pub use orderbook::{Orderbook, PriceLevel};
pub use trade::{Direction, Trade};

pub(crate) use trade::split_pair;
