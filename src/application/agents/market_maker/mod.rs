//! Market Maker Agent
//!
//! Quotes a bid/ask pair around a predicted future price and profits from
//! a shrinking spread:
//! - estimate the short-term price trend from the book's history
//! - anchor one quote on each side of the predicted price range
//! - hold one side fixed while the other walks toward it at the gradient,
//!   so the spread has converged to the margin by the end of the bet
//!
//! One bet at a time. A bet that cannot keep both sides quoted is unwound
//! on the spot: an unmatched single-sided order is never left resting.

mod config;
mod gradient;
mod pricer;

pub use config::MarketMakerConfig;
pub use gradient::price_gradient;
pub use pricer::{Anchors, OPEN_THRESHOLD, ask_price, bid_price, opening_anchors};

use log::{debug, info};
use rand::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use super::{Agent, AgentId};
use crate::application::exchange::Exchange;
use crate::domain::OrderHandle;

/// One open-update-close cycle of a bid/ask pair.
#[derive(Debug)]
struct Bet {
    /// Trend estimate captured when the bet opened; fixed for the bet.
    gradient: Decimal,
    /// Anchor the bid holds at (or departs from, when falling).
    initial_bid_price: Decimal,
    /// Anchor the ask holds at (or departs from, when rising).
    initial_ask_price: Decimal,
    bid: OrderHandle,
    ask: OrderHandle,
}

/// Market maker agent.
pub struct MarketMaker {
    id: AgentId,
    config: MarketMakerConfig,
    /// Ticks since the last bet fully closed (or since creation). Starts
    /// inside the configured stagger range, so it can be negative.
    ticks_since_bet_end: i64,
    /// `None` exactly while idle.
    current_bet: Option<Bet>,
}

impl MarketMaker {
    pub fn new(id: impl Into<String>, config: MarketMakerConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (low, high) = config.stagger;
        let ticks_since_bet_end = if low == high {
            low
        } else {
            rng.gen_range(low..=high)
        };

        Self {
            id: AgentId::new(id),
            config,
            ticks_since_bet_end,
            current_bet: None,
        }
    }

    pub fn config(&self) -> &MarketMakerConfig {
        &self.config
    }

    pub fn is_idle(&self) -> bool {
        self.current_bet.is_none()
    }

    pub fn ticks_since_bet_end(&self) -> i64 {
        self.ticks_since_bet_end
    }

    /// Convert any leftover-asset balance into the market's quote asset,
    /// keeping capital deployable instead of stranded.
    fn sweep(&self, exchange: &mut Exchange) {
        let market = self.config.market;
        let leftover = market.leftover();
        let balance = exchange.available(&self.id, leftover);
        if balance > Decimal::ZERO {
            if let Err(err) =
                exchange.market_sell_with_fee(&self.id, leftover, market.quote(), balance)
            {
                debug!("{}: sweep of {balance} {leftover} failed: {err}", self.id);
            }
        }
    }

    /// Quote the bid for this tick. `ticks_in_bet` is the time since the
    /// cooldown ended.
    fn place_bid(
        &self,
        exchange: &mut Exchange,
        ticks_in_bet: i64,
        gradient: Decimal,
        anchor: Decimal,
    ) -> Option<OrderHandle> {
        let market = self.config.market;
        let price = pricer::bid_price(anchor, gradient, ticks_in_bet);
        if price <= Decimal::ZERO {
            debug!("{}: bid schedule reached {price}, not quoting", self.id);
            return None;
        }
        let budget = exchange.available(&self.id, market.quote()) * self.config.bet_percentage;
        // Round toward zero so the cost stays within the balance just queried
        let quantity =
            (budget / price).round_dp_with_strategy(12, RoundingStrategy::ToZero);
        match exchange.place_bid_with_fee(&self.id, market, quantity, price) {
            Ok(handle) => Some(handle),
            Err(err) => {
                debug!("{}: bid rejected: {err}", self.id);
                None
            }
        }
    }

    /// Quote the ask for this tick.
    fn place_ask(
        &self,
        exchange: &mut Exchange,
        ticks_in_bet: i64,
        gradient: Decimal,
        anchor: Decimal,
    ) -> Option<OrderHandle> {
        let market = self.config.market;
        let price = pricer::ask_price(anchor, gradient, ticks_in_bet);
        if price <= Decimal::ZERO {
            debug!("{}: ask schedule reached {price}, not quoting", self.id);
            return None;
        }
        let quantity = exchange.available(&self.id, market.base()) * self.config.bet_percentage;
        match exchange.place_ask_with_fee(&self.id, market, quantity, price) {
            Ok(handle) => Some(handle),
            Err(err) => {
                debug!("{}: ask rejected: {err}", self.id);
                None
            }
        }
    }

    /// Open a new bet if the market gives a usable signal. Counts as a
    /// no-op when the signal is unknown or sits in the threshold dead
    /// zone; on a placement failure the cooldown restarts instead.
    fn try_open(&mut self, exchange: &mut Exchange) {
        let market = self.config.market;
        let Some(gradient) = price_gradient(exchange.price_history(market)) else {
            return;
        };
        let start_price = exchange.price(market);
        let Some(anchors) = pricer::opening_anchors(
            start_price,
            gradient,
            self.config.bet_length,
            self.config.bet_margin,
        ) else {
            return;
        };

        let ticks_in_bet = self.ticks_since_bet_end - self.config.minimal_wait;
        let Some(bid) = self.place_bid(exchange, ticks_in_bet, gradient, anchors.bid) else {
            self.ticks_since_bet_end = 0;
            return;
        };
        let Some(ask) = self.place_ask(exchange, ticks_in_bet, gradient, anchors.ask) else {
            // Never leave an unmatched single-sided order resting
            exchange.cancel(&bid);
            self.ticks_since_bet_end = 0;
            return;
        };

        info!(
            "{}: opened bet on {market}: gradient {gradient}, bid anchor {}, ask anchor {}",
            self.id, anchors.bid, anchors.ask
        );
        self.current_bet = Some(Bet {
            gradient,
            initial_bid_price: anchors.bid,
            initial_ask_price: anchors.ask,
            bid,
            ask,
        });
    }

    /// Re-quote both sides of the running bet. Quantities are recomputed
    /// from the current balances, so partial fills since the last tick are
    /// absorbed without changing the fractional commitment.
    fn update_bet(&mut self, exchange: &mut Exchange, bet: Bet) {
        exchange.cancel(&bet.bid);
        exchange.cancel(&bet.ask);

        let ticks_in_bet = self.ticks_since_bet_end - self.config.minimal_wait;
        let Some(bid) = self.place_bid(exchange, ticks_in_bet, bet.gradient, bet.initial_bid_price)
        else {
            self.abort_bet();
            return;
        };
        let Some(ask) = self.place_ask(exchange, ticks_in_bet, bet.gradient, bet.initial_ask_price)
        else {
            exchange.cancel(&bid);
            self.abort_bet();
            return;
        };

        self.current_bet = Some(Bet { bid, ask, ..bet });
    }

    fn close_bet(&mut self, exchange: &mut Exchange, bet: Bet) {
        exchange.cancel(&bet.bid);
        exchange.cancel(&bet.ask);
        self.ticks_since_bet_end = 0;
        info!("{}: closed bet on {}", self.id, self.config.market);
    }

    fn abort_bet(&mut self) {
        self.ticks_since_bet_end = 0;
        debug!("{}: aborted bet, cooldown restarted", self.id);
    }
}

impl Agent for MarketMaker {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn on_tick(&mut self, exchange: &mut Exchange) {
        self.sweep(exchange);

        if let Some(bet) = self.current_bet.take() {
            if self.ticks_since_bet_end >= self.config.minimal_wait + self.config.bet_length {
                self.close_bet(exchange, bet);
            } else {
                self.update_bet(exchange, bet);
            }
        } else if self.ticks_since_bet_end >= self.config.minimal_wait {
            self.try_open(exchange);
        }

        self.ticks_since_bet_end += 1;
    }

    fn agent_type(&self) -> &'static str {
        "MarketMaker"
    }
}
