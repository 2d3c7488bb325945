//! Market maker configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::TradeMarket;

/// Configuration for the market maker agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMakerConfig {
    /// Cooldown ticks after a bet closes (letting the market recover)
    /// before the next bet may open.
    pub minimal_wait: i64,

    /// Planned duration of a bet, in ticks.
    pub bet_length: i64,

    /// Fraction of the available balance committed per side. Both sides
    /// are re-sized every tick, so partial fills are absorbed.
    pub bet_percentage: Decimal,

    /// How far the opening quotes sit from the predicted price range;
    /// also how close the two sides end up at bet end.
    pub bet_margin: Decimal,

    /// The order book this maker quotes into.
    pub market: TradeMarket,

    /// Inclusive range the initial tick counter is drawn from, so
    /// co-located makers do not open bets in lockstep.
    pub stagger: (i64, i64),

    /// Random seed (for reproducibility).
    pub seed: Option<u64>,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            minimal_wait: 10,
            bet_length: 30,
            bet_percentage: dec!(1),
            bet_margin: dec!(0.99),
            market: TradeMarket::TokenFiat,
            stagger: (-20, 10),
            seed: None,
        }
    }
}

impl MarketMakerConfig {
    /// Set the traded market (builder pattern)
    pub fn with_market(mut self, market: TradeMarket) -> Self {
        self.market = market;
        self
    }

    /// Set the seed (builder pattern)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start the counter at exactly zero instead of a random stagger.
    pub fn without_stagger(mut self) -> Self {
        self.stagger = (0, 0);
        self
    }
}
