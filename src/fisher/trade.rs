//! FishingTrade: one bait-to-resolution order lifecycle.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculator::{self, TradeVerdict};
use crate::domain::{Direction, Trade, split_pair};
use crate::exchanges::{ExchangeError, ExchangeGateway, HoldToken, Result};

/// A bait resting this many levels deep in the opposing book, while priced
/// more than twice the offset away, is considered unfillable and cancelled.
const BAIT_DEPTH_CANCEL: usize = 10;

/// Policy: when the bait vanishes on an exchange whose trade history cannot
/// be queried, assume it was fully filled and submit the match order. This
/// can fabricate a match for a bait the exchange actually cancelled; kept
/// deliberately, as the safer default is locking in the hedge.
const ASSUME_FILLED_WHEN_HISTORY_UNTRUSTED: Decimal = Decimal::ONE;

/// State of a [`FishingTrade`]. `Complete` is terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FishState {
    /// Bait order resting on the target exchange, polled each tick.
    Fishing,
    /// Bait left the book; reconcile the filled fraction.
    Taken,
    /// Bait must be pulled; reconcile whatever filled before the pull.
    Cancel,
    /// Match order resting on the reference exchange, polled each tick.
    Matched,
    /// Both legs done; report the outcome once.
    Profit,
    /// Nothing left to do.
    Complete,
}

impl std::fmt::Display for FishState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FishState::Fishing => "fishing",
            FishState::Taken => "taken",
            FishState::Cancel => "cancel",
            FishState::Matched => "matched",
            FishState::Profit => "profit",
            FishState::Complete => "complete",
        };
        write!(f, "{}", s)
    }
}

/// One bait order on the target exchange paired with a match order on the
/// reference exchange.
///
/// Owns an exclusive hold on the reference-exchange balance funding the
/// match trade; the hold is released exactly once, on any terminal path.
/// All exchange reads happen before state commits, so a failed poll leaves
/// the machine where it was.
pub struct FishingTrade {
    fund: String,
    pair: String,
    offset: Decimal,
    reference: Arc<dyn ExchangeGateway>,
    target: Arc<dyn ExchangeGateway>,
    bait: Trade,
    match_trade: Trade,
    bait_order_id: u64,
    match_order_id: u64,
    matched_fraction: Decimal,
    held_amount: Decimal,
    hold: Option<HoldToken>,
    match_sized: bool,
    state: FishState,
}

impl FishingTrade {
    pub fn new(
        offset: Decimal,
        reference: Arc<dyn ExchangeGateway>,
        target: Arc<dyn ExchangeGateway>,
        bait: Trade,
        match_trade: Trade,
    ) -> FishingTrade {
        FishingTrade {
            fund: bait.fund.clone(),
            pair: bait.pair.clone(),
            offset,
            reference,
            target,
            bait,
            match_trade,
            bait_order_id: 0,
            match_order_id: 0,
            matched_fraction: Decimal::ZERO,
            held_amount: Decimal::ZERO,
            hold: None,
            match_sized: false,
            state: FishState::Fishing,
        }
    }

    pub fn state(&self) -> FishState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == FishState::Complete
    }

    /// Fraction of the bait volume actually filled, in [0, 1].
    pub fn matched_fraction(&self) -> Decimal {
        self.matched_fraction
    }

    pub fn bait_order_id(&self) -> u64 {
        self.bait_order_id
    }

    pub fn match_order_id(&self) -> u64 {
        self.match_order_id
    }

    /// Reserves the match-trade balance on the reference exchange and
    /// places the bait order on the target exchange.
    pub async fn start(&mut self) -> Result<()> {
        let (base, quote) = split_pair(&self.pair)
            .ok_or_else(|| ExchangeError::PairNotSupported(self.pair.clone()))?;
        let hold_coin = self.match_trade.direction.input_coin(base, quote);

        let token = self
            .reference
            .hold(&self.fund, hold_coin, self.match_trade.volume_in)?;
        self.held_amount = self.match_trade.volume_in;
        self.hold = Some(token);

        match self.target.create_order(&self.bait).await {
            Ok(id) => {
                self.bait_order_id = id;
                info!(
                    pair = %self.pair,
                    direction = %self.bait.direction,
                    order = id,
                    rate = %self.bait.price,
                    volume = %self.bait.volume_in,
                    "bait order placed"
                );
                Ok(())
            }
            Err(e) => {
                self.release_hold();
                Err(e)
            }
        }
    }

    /// Advances the state machine, re-evaluating until a pass produces no
    /// state change. Transitions like `Taken` with nothing filled resolve to
    /// `Complete` within the same poll instead of waiting a tick.
    ///
    /// A cancellation raised by the gateway is swallowed; any other error is
    /// logged and left for the next tick to retry.
    pub async fn update(&mut self) {
        loop {
            let before = self.state;
            match self.step().await {
                Ok(()) => {}
                Err(ExchangeError::Cancelled) => return,
                Err(e) => {
                    warn!(
                        pair = %self.pair,
                        state = %before,
                        error = %e,
                        "poll failed, retrying next tick"
                    );
                    return;
                }
            }
            if self.state == before {
                return;
            }
        }
    }

    /// Best-effort teardown on deactivation: a resting bait is routed
    /// through `Cancel`, a resting match order is cancelled directly.
    pub async fn shutdown(&mut self) {
        match self.state {
            FishState::Fishing => {
                self.state = FishState::Cancel;
                self.update().await;
            }
            FishState::Matched => {
                if let Err(e) = self
                    .reference
                    .cancel_order(&self.pair, self.match_order_id)
                    .await
                {
                    warn!(
                        pair = %self.pair,
                        order = self.match_order_id,
                        error = %e,
                        "failed to cancel match order during shutdown"
                    );
                }
                self.match_order_id = 0;
                self.state = FishState::Complete;
            }
            _ => {}
        }
        self.release_hold();
    }

    async fn step(&mut self) -> Result<()> {
        match self.state {
            FishState::Fishing => self.poll_bait().await,
            FishState::Taken | FishState::Cancel => self.resolve().await,
            FishState::Matched => self.poll_match().await,
            FishState::Profit => {
                self.report_profit();
                Ok(())
            }
            FishState::Complete => Ok(()),
        }
    }

    /// Polls the resting bait and decides whether to keep fishing.
    async fn poll_bait(&mut self) -> Result<()> {
        let Some(order) = self.target.order(self.bait_order_id).await? else {
            self.matched_fraction = self.bait_fill_fraction().await?;
            info!(
                pair = %self.pair,
                fraction = %self.matched_fraction,
                "bait order left the book"
            );
            self.state = FishState::Taken;
            return Ok(());
        };

        let reference_book = self.reference.orderbook(&self.pair).await?;
        let target_book = self.target.orderbook(&self.pair).await?;

        let match_trade = calculator::derive_trade(
            &self.fund,
            &reference_book,
            self.match_trade.direction,
            self.reference.fee(&self.pair),
            self.held_amount,
        );
        let live = calculator::derive_trade(
            &self.fund,
            &target_book,
            self.bait.direction,
            self.target.fee(&self.pair),
            order.remaining,
        );

        // All reads succeeded; commit the observations.
        self.matched_fraction = order.filled_fraction();
        let reference_rate = match_trade.inverse_price();
        self.match_trade = match_trade;

        if reference_rate <= Decimal::ZERO {
            warn!(pair = %self.pair, "reference price is zero, pulling bait");
            self.state = FishState::Cancel;
            return Ok(());
        }

        let fishing_ratio = (self.bait.price - reference_rate) / reference_rate;
        let current_ratio = (live.price - reference_rate) / reference_rate;

        if fishing_ratio <= self.offset {
            info!(
                pair = %self.pair,
                ratio = %fishing_ratio,
                offset = %self.offset,
                "bait drifted inside the offset, pulling"
            );
            self.state = FishState::Cancel;
        } else if fishing_ratio > dec!(2) * self.offset
            && calculator::depth_of_rate(&target_book, self.bait.direction, self.bait.price)
                >= BAIT_DEPTH_CANCEL
        {
            info!(
                pair = %self.pair,
                ratio = %fishing_ratio,
                "bait resting too deep to fill at a sane price, pulling"
            );
            self.state = FishState::Cancel;
        } else if calculator::validate(&self.match_trade, Some(self.held_amount))
            != TradeVerdict::Valid
        {
            warn!(pair = %self.pair, "match trade no longer viable, pulling bait");
            self.state = FishState::Cancel;
        } else if current_ratio > dec!(1.5) * self.offset {
            info!(
                pair = %self.pair,
                ratio = %current_ratio,
                "position could close at a superior price right now"
            );
        }
        Ok(())
    }

    /// Pulls the bait if needed, releases the hold and reconciles whatever
    /// filled with a match order on the reference exchange.
    async fn resolve(&mut self) -> Result<()> {
        let cancelled = self.state == FishState::Cancel;

        if self.bait_order_id != 0 {
            if cancelled {
                match self.target.cancel_order(&self.pair, self.bait_order_id).await {
                    Ok(()) => {}
                    // Already off the book; the last observed fill stands.
                    Err(ExchangeError::OrderNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
            self.bait_order_id = 0;
        }
        self.release_hold();

        if self.matched_fraction <= Decimal::ZERO {
            info!(pair = %self.pair, "bait resolved with nothing filled");
            self.state = FishState::Complete;
            return Ok(());
        }

        if !self.match_sized {
            self.bait = self.bait.partial(self.matched_fraction);
            self.match_trade = self.match_trade.partial(self.matched_fraction);
            self.match_sized = true;
        }

        match calculator::validate(&self.match_trade, None) {
            TradeVerdict::Valid => {
                let id = self.reference.create_order(&self.match_trade).await?;
                if cancelled {
                    info!(
                        pair = %self.pair,
                        order = id,
                        "match order submitted for pulled bait, not monitoring"
                    );
                    self.state = FishState::Complete;
                } else {
                    info!(pair = %self.pair, order = id, "match order submitted");
                    self.match_order_id = id;
                    self.state = FishState::Matched;
                }
            }
            verdict => {
                warn!(
                    pair = %self.pair,
                    %verdict,
                    fraction = %self.matched_fraction,
                    "match trade invalid, abandoning reconciliation"
                );
                self.state = FishState::Complete;
            }
        }
        Ok(())
    }

    /// Polls the match order until its fill is confirmed.
    async fn poll_match(&mut self) -> Result<()> {
        if self.reference.order(self.match_order_id).await?.is_some() {
            return Ok(());
        }
        if self.reference.trade_history_is_trustworthy() {
            if self
                .reference
                .completed_trade(self.match_order_id)
                .await?
                .is_some()
            {
                self.state = FishState::Profit;
            }
            // History may lag the order book; keep polling until it shows.
        } else {
            self.state = FishState::Profit;
        }
        Ok(())
    }

    /// Entry-only: computes both-leg currency deltas, values them in the
    /// quote currency and logs the result to the normal and wins logs.
    fn report_profit(&mut self) {
        let (base, quote) = split_pair(&self.pair).unwrap_or(("base", "quote"));

        // Bait leg on the target spent volume_in and received nett_volume;
        // the match leg on the reference did the reverse conversion.
        let in_delta = self.match_trade.nett_volume - self.bait.volume_in;
        let out_delta = self.bait.nett_volume - self.match_trade.volume_in;
        let (base_delta, quote_delta) = match self.bait.direction {
            Direction::BaseToQuote => (in_delta, out_delta),
            Direction::QuoteToBase => (out_delta, in_delta),
        };

        let quote_per_base = match self.bait.direction {
            Direction::BaseToQuote => self.match_trade.inverse_price(),
            Direction::QuoteToBase => self.match_trade.price,
        };
        let profit = base_delta * quote_per_base + quote_delta;

        info!(
            pair = %self.pair,
            direction = %self.bait.direction,
            base_delta = %base_delta,
            quote_delta = %quote_delta,
            profit = %profit,
            unit = quote,
            "fishing trade completed"
        );
        info!(
            target: "wins",
            pair = %self.pair,
            direction = %self.bait.direction,
            base = base,
            quote = quote,
            profit = %profit,
            "profit realized"
        );
        self.state = FishState::Complete;
    }

    /// Determines the filled fraction of a vanished bait from trade history,
    /// falling back to the assume-filled policy when history is unreliable.
    async fn bait_fill_fraction(&self) -> Result<Decimal> {
        if !self.target.trade_history_is_trustworthy() {
            return Ok(ASSUME_FILLED_WHEN_HISTORY_UNTRUSTED);
        }
        match self.target.completed_trade(self.bait_order_id).await? {
            Some(record) if self.bait.volume_in > Decimal::ZERO => {
                Ok((record.volume_in / self.bait.volume_in).clamp(Decimal::ZERO, Decimal::ONE))
            }
            Some(_) => Ok(Decimal::ONE),
            None => Ok(Decimal::ZERO),
        }
    }

    fn release_hold(&mut self) {
        if let Some(token) = self.hold.take() {
            self.reference.release(token);
        }
    }
}

impl Drop for FishingTrade {
    fn drop(&mut self) {
        // Backstop; normal paths release on entering the terminal state.
        self.release_hold();
    }
}
