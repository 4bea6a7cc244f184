//! Immutable per-tick state snapshot for the host.

use serde::Serialize;

use super::FishState;

/// Snapshot of a Fisher's externally visible state, emitted through a watch
/// channel after every tick. The host subscribes to this instead of
/// field-level change callbacks.
#[derive(Debug, Clone, Serialize)]
pub struct FisherSnapshot {
    /// Trading pair this Fisher works.
    pub pair: String,
    /// Whether the Fisher is activated.
    pub active: bool,
    /// State of the Base→Quote trade, if one exists.
    pub base_to_quote: Option<FishState>,
    /// State of the Quote→Base trade, if one exists.
    pub quote_to_base: Option<FishState>,
    /// Most recent suppressible warning, if any.
    pub last_warning: Option<String>,
}

impl FisherSnapshot {
    pub(super) fn initial(pair: &str) -> FisherSnapshot {
        FisherSnapshot {
            pair: pair.to_string(),
            active: false,
            base_to_quote: None,
            quote_to_base: None,
            last_warning: None,
        }
    }
}
