//! Fisher error types.

use crate::exchanges::ExchangeError;

/// Fisher error type.
#[derive(Debug, thiserror::Error)]
pub enum FisherError {
    #[error("fisher is already active")]
    AlreadyActive,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("exchange error: {0}")]
    Exchange(#[from] ExchangeError),
}
