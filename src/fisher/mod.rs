//! Per-configuration fishing controller.
//!
//! A Fisher owns at most two [`FishingTrade`]s, one per enabled direction.
//! On each tick it creates a fresh trade where the previous one completed,
//! or advances the one in flight.

mod error;
mod snapshot;
mod trade;


pub use error::FisherError;
pub use snapshot::FisherSnapshot;
pub use trade::{FishState, FishingTrade};

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::calculator::{self, TradeVerdict};
use crate::config::FishingConfig;
use crate::domain::{Direction, Trade, split_pair};
use crate::exchanges::{self, ExchangeError, ExchangeGateway};

/// Fraction of the post-fee balance actually committed to a trade, guarding
/// against fee-rounding edge cases on the exchange side.
const BALANCE_SHAVE: Decimal = dec!(0.99999);

enum BuildOutcome {
    Ready(FishingTrade),
    NotViable(String),
}

/// Controller for one fishing configuration across two exchanges.
///
/// Single-owner: one logical task drives `run`/`tick`; no tick for the same
/// Fisher runs concurrently with another.
pub struct Fisher {
    config: FishingConfig,
    reference: Arc<dyn ExchangeGateway>,
    target: Arc<dyn ExchangeGateway>,
    active: bool,
    base_to_quote: Option<FishingTrade>,
    quote_to_base: Option<FishingTrade>,
    // One fingerprint per direction; the directions fail independently.
    last_warning: [Option<String>; 2],
    snapshot_tx: watch::Sender<FisherSnapshot>,
}

impl Fisher {
    pub fn new(
        config: FishingConfig,
        reference: Arc<dyn ExchangeGateway>,
        target: Arc<dyn ExchangeGateway>,
    ) -> Fisher {
        let (snapshot_tx, _) = watch::channel(FisherSnapshot::initial(&config.pair));
        Fisher {
            config,
            reference,
            target,
            active: false,
            base_to_quote: None,
            quote_to_base: None,
            last_warning: [None, None],
            snapshot_tx,
        }
    }

    /// Subscribes to per-tick state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<FisherSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// UI-facing validity check: the configuration invariant plus the
    /// offset-versus-fees profitability requirement. The engine itself only
    /// enforces profitability at poll time.
    pub fn validity(&self) -> Option<String> {
        let reference_fee = self.reference.fee(&self.config.pair);
        let target_fee = self.target.fee(&self.config.pair);
        self.config.validity_with_fees(reference_fee, target_fee)
    }

    /// Activates or deactivates the controller.
    ///
    /// Activation validates the configuration and the pair on both
    /// exchanges; any failure is fatal and leaves no state behind.
    /// Deactivation cancels in-flight trades best-effort.
    pub async fn activate(&mut self, enable: bool) -> Result<(), FisherError> {
        if !enable {
            return self.deactivate().await;
        }
        if self.active {
            return Err(FisherError::AlreadyActive);
        }
        if let Some(reason) = self.config.invalid_reason() {
            return Err(FisherError::Config(reason));
        }
        if self.reference.name() == self.target.name() {
            return Err(FisherError::Config(format!(
                "both pairs resolve to the same exchange {}",
                self.reference.name()
            )));
        }

        let pair = &self.config.pair;
        for (label, gateway) in [("reference", &self.reference), ("target", &self.target)] {
            if !gateway.has_pair(pair) {
                return Err(FisherError::Config(format!(
                    "pair {} not found on {} exchange {}",
                    pair,
                    label,
                    gateway.name()
                )));
            }
            if gateway.pair_is_synthetic(pair) {
                return Err(FisherError::Config(format!(
                    "pair {} is synthetic on {} exchange {}",
                    pair,
                    label,
                    gateway.name()
                )));
            }
        }

        let reference_currencies = self
            .reference
            .pair_currencies(pair)
            .map_err(|e| FisherError::Config(e.to_string()))?;
        let target_currencies = self
            .target
            .pair_currencies(pair)
            .map_err(|e| FisherError::Config(e.to_string()))?;
        if reference_currencies != target_currencies {
            return Err(FisherError::Config(format!(
                "currency symbols differ across exchanges: {:?} vs {:?}",
                reference_currencies, target_currencies
            )));
        }

        info!(
            pair = %pair,
            reference = self.reference.name(),
            target = self.target.name(),
            offset = %self.config.price_offset,
            "fisher activated"
        );
        self.active = true;
        self.publish();
        Ok(())
    }

    async fn deactivate(&mut self) -> Result<(), FisherError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        for slot in [&mut self.base_to_quote, &mut self.quote_to_base] {
            if let Some(trade) = slot {
                trade.shutdown().await;
            }
        }
        info!(pair = %self.config.pair, "fisher deactivated");
        self.publish();
        Ok(())
    }

    /// Drives the periodic tick until deactivated or signalled to shut down.
    pub async fn run(&mut self, shutdown: &mut watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.tick_interval());
        info!(
            pair = %self.config.pair,
            interval = ?self.config.tick_interval(),
            "starting fishing tick loop"
        );
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !self.active {
                        break;
                    }
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        if let Err(e) = self.activate(false).await {
                            warn!(error = %e, "deactivation failed");
                        }
                        break;
                    }
                }
            }
        }
    }

    /// One tick: independently per enabled direction, create a trade or
    /// advance the existing one, then publish a state snapshot.
    pub async fn tick(&mut self) {
        if !self.active {
            return;
        }
        if self.config.base_to_quote {
            self.tick_direction(Direction::BaseToQuote).await;
        }
        if self.config.quote_to_base {
            self.tick_direction(Direction::QuoteToBase).await;
        }
        self.publish();
    }

    pub fn trade(&self, direction: Direction) -> Option<&FishingTrade> {
        match direction {
            Direction::BaseToQuote => self.base_to_quote.as_ref(),
            Direction::QuoteToBase => self.quote_to_base.as_ref(),
        }
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Option<FishingTrade> {
        match direction {
            Direction::BaseToQuote => &mut self.base_to_quote,
            Direction::QuoteToBase => &mut self.quote_to_base,
        }
    }

    async fn tick_direction(&mut self, direction: Direction) {
        let needs_new = match self.trade(direction) {
            Some(trade) => trade.is_complete(),
            None => true,
        };
        if needs_new {
            self.try_create(direction).await;
        } else if let Some(trade) = self.slot_mut(direction).as_mut() {
            trade.update().await;
        }
    }

    /// Attempts to set up and start a new FishingTrade for the direction.
    /// Unfavorable conditions are logged once, not every tick.
    async fn try_create(&mut self, direction: Direction) {
        let outcome = match self.build_trade(direction).await {
            Ok(outcome) => outcome,
            Err(ExchangeError::Cancelled) => return,
            Err(e) => {
                warn!(
                    pair = %self.config.pair,
                    %direction,
                    error = %e,
                    "trade setup failed, retrying next tick"
                );
                return;
            }
        };
        match outcome {
            BuildOutcome::Ready(mut trade) => match trade.start().await {
                Ok(()) => {
                    *self.warning_slot(direction) = None;
                    *self.slot_mut(direction) = Some(trade);
                }
                Err(ExchangeError::Cancelled) => {}
                Err(e) => self.warn_once(direction, &format!("start failed: {}", e)),
            },
            BuildOutcome::NotViable(reason) => self.warn_once(direction, &reason),
        }
    }

    /// Derives the match and bait trades for a direction from live books
    /// and balances.
    async fn build_trade(&self, direction: Direction) -> exchanges::Result<BuildOutcome> {
        let pair = &self.config.pair;
        let (base, quote) =
            split_pair(pair).ok_or_else(|| ExchangeError::PairNotSupported(pair.clone()))?;
        let match_direction = direction.opposite();
        let reference_coin = match_direction.input_coin(base, quote);
        let target_coin = direction.input_coin(base, quote);

        let reference_fee = self.reference.fee(pair);
        let target_fee = self.target.fee(pair);

        let available_reference = self
            .spendable(self.reference.as_ref(), reference_coin, reference_fee)
            .await?;
        let available_target = self
            .spendable(self.target.as_ref(), target_coin, target_fee)
            .await?;

        let reference_book = self.reference.orderbook(pair).await?;
        let target_book = self.target.orderbook(pair).await?;

        let match_trade = calculator::derive_trade(
            &self.config.fund,
            &reference_book,
            match_direction,
            reference_fee,
            available_reference,
        );
        let bait_volume = match_trade.nett_volume.min(available_target);
        // Size the match leg to the bait it hedges, not the whole balance.
        let match_trade = if Decimal::ZERO < bait_volume && bait_volume < match_trade.nett_volume {
            match_trade.partial(bait_volume / match_trade.nett_volume)
        } else {
            match_trade
        };
        let market_trade = calculator::derive_trade(
            &self.config.fund,
            &target_book,
            direction,
            target_fee,
            bait_volume,
        );
        let bait_price =
            calculator::derive_bait_price(&match_trade, &market_trade, self.config.price_offset);
        let bait = Trade::from_price(
            &self.config.fund,
            direction,
            pair,
            bait_price,
            bait_volume,
            target_fee,
            market_trade.depth,
        );

        match calculator::validate(&match_trade, None) {
            TradeVerdict::Valid => {}
            verdict => {
                return Ok(BuildOutcome::NotViable(format!(
                    "match trade not viable: {}",
                    verdict
                )));
            }
        }
        match calculator::validate(&bait, None) {
            TradeVerdict::Valid => {}
            verdict => {
                return Ok(BuildOutcome::NotViable(format!(
                    "bait trade not viable: {}",
                    verdict
                )));
            }
        }

        Ok(BuildOutcome::Ready(FishingTrade::new(
            self.config.price_offset,
            Arc::clone(&self.reference),
            Arc::clone(&self.target),
            bait,
            match_trade,
        )))
    }

    /// Post-fee balance available for trading a coin, shaved and capped by
    /// the configured auto-trading limit.
    async fn spendable(
        &self,
        gateway: &dyn ExchangeGateway,
        coin: &str,
        fee: Decimal,
    ) -> exchanges::Result<Decimal> {
        let mut amount = gateway.available(&self.config.fund, coin).await?
            * (Decimal::ONE - fee)
            * BALANCE_SHAVE;
        if let Some(limit) = gateway.auto_trading_limit(coin) {
            amount = amount.min(limit);
        }
        Ok(amount.max(Decimal::ZERO))
    }

    fn warning_slot(&mut self, direction: Direction) -> &mut Option<String> {
        match direction {
            Direction::BaseToQuote => &mut self.last_warning[0],
            Direction::QuoteToBase => &mut self.last_warning[1],
        }
    }

    /// Logs a warning unless it exactly repeats the previous one for the
    /// same direction. The fingerprint resets whenever a trade is
    /// successfully created or a different warning arrives.
    fn warn_once(&mut self, direction: Direction, reason: &str) {
        if self.warning_slot(direction).as_deref() == Some(reason) {
            return;
        }
        warn!(pair = %self.config.pair, %direction, reason, "fishing trade not created");
        *self.warning_slot(direction) = Some(reason.to_string());
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(FisherSnapshot {
            pair: self.config.pair.clone(),
            active: self.active,
            base_to_quote: self.base_to_quote.as_ref().map(|t| t.state()),
            quote_to_base: self.quote_to_base.as_ref().map(|t| t.state()),
            last_warning: self.last_warning[0]
                .clone()
                .or_else(|| self.last_warning[1].clone()),
        });
    }
}
