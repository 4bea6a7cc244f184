//! Cross-exchange "fishing" arbitrage core.
//!
//! Rests a bait limit order on a target exchange at a price offset from a
//! reference exchange, and reconciles fills with a match order on the
//! reference exchange. The host platform supplies connectors through the
//! [`exchanges::ExchangeGateway`] contract and drives [`fisher::Fisher`]
//! instances.

pub mod calculator;
pub mod config;
pub mod domain;
pub mod exchanges;
pub mod fisher;
