//! Random Trader Agent
//!
//! A background trader providing taker flow against resting quotes.
//! Profit source: none (loses on average to the spread).
//! Role: moves the trade price and fills the market maker's orders.

use log::debug;
use rand::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{Agent, AgentId};
use crate::application::exchange::Exchange;
use crate::domain::TradeMarket;

/// Configuration for random trader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomTraderConfig {
    /// The order book this trader takes from.
    pub market: TradeMarket,
    /// Probability of trading each tick (0-1)
    pub trade_probability: f64,
    /// Fraction of the relevant balance committed per trade.
    pub order_fraction: Decimal,
    /// How far through the touch orders are priced, as a fraction of the
    /// current price.
    pub aggression: Decimal,
    /// Random seed (for reproducibility)
    pub seed: Option<u64>,
}

impl Default for RandomTraderConfig {
    fn default() -> Self {
        Self {
            market: TradeMarket::TokenFiat,
            trade_probability: 0.2,
            order_fraction: dec!(0.1),
            aggression: dec!(0.05),
            seed: None,
        }
    }
}

/// Random trader agent
pub struct RandomTrader {
    id: AgentId,
    config: RandomTraderConfig,
    rng: StdRng,
}

impl RandomTrader {
    pub fn new(id: impl Into<String>, config: RandomTraderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            id: AgentId::new(id),
            config,
            rng,
        }
    }
}

impl Agent for RandomTrader {
    fn id(&self) -> &AgentId {
        &self.id
    }

    fn on_tick(&mut self, exchange: &mut Exchange) {
        // Random chance to trade
        if self.rng.r#gen::<f64>() > self.config.trade_probability {
            return;
        }

        let market = self.config.market;
        let price = exchange.price(market);
        if price <= Decimal::ZERO {
            return;
        }

        // Random buy or sell, priced through the touch so it takes
        let is_buy = self.rng.r#gen::<bool>();
        let outcome = if is_buy {
            let limit = price * (Decimal::ONE + self.config.aggression);
            let budget = exchange.available(&self.id, market.quote()) * self.config.order_fraction;
            let quantity = (budget / limit).round_dp_with_strategy(12, RoundingStrategy::ToZero);
            exchange.place_bid_with_fee(&self.id, market, quantity, limit)
        } else {
            let limit = price * (Decimal::ONE - self.config.aggression);
            let quantity =
                exchange.available(&self.id, market.base()) * self.config.order_fraction;
            exchange.place_ask_with_fee(&self.id, market, quantity, limit)
        };

        if let Err(err) = outcome {
            debug!("{}: order rejected: {err}", self.id);
        }
    }

    fn agent_type(&self) -> &'static str {
        "RandomTrader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::exchange::{ExchangeConfig, Wallet};
    use rust_decimal_macros::dec;

    fn test_exchange() -> Exchange {
        Exchange::new(ExchangeConfig::default().without_fees())
    }

    fn funded_trader(exchange: &mut Exchange, config: RandomTraderConfig) -> RandomTrader {
        let trader = RandomTrader::new("rnd-1", config);
        exchange.open_account(
            trader.id().clone(),
            Wallet::new(dec!(1000), dec!(1000), Decimal::ZERO),
        );
        trader
    }

    #[test]
    fn test_trades_every_tick_at_full_probability() {
        let mut exchange = test_exchange();
        let config = RandomTraderConfig {
            trade_probability: 1.0,
            seed: Some(42),
            ..Default::default()
        };
        let mut trader = funded_trader(&mut exchange, config);

        for _ in 0..10 {
            trader.on_tick(&mut exchange);
        }
        let (bids, asks) = exchange.resting_orders(trader.id(), TradeMarket::TokenFiat);
        let fills = exchange.total_trades();
        assert!(
            !bids.is_empty() || !asks.is_empty() || fills > 0,
            "ten forced ticks must leave some trace on the book"
        );
    }

    #[test]
    fn test_never_trades_at_zero_probability() {
        let mut exchange = test_exchange();
        let config = RandomTraderConfig {
            trade_probability: 0.0,
            seed: Some(42),
            ..Default::default()
        };
        let mut trader = funded_trader(&mut exchange, config);

        for _ in 0..100 {
            trader.on_tick(&mut exchange);
        }
        let (bids, asks) = exchange.resting_orders(trader.id(), TradeMarket::TokenFiat);
        assert!(bids.is_empty() && asks.is_empty());
        assert_eq!(exchange.total_trades(), 0);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = RandomTraderConfig {
            trade_probability: 0.5,
            seed: Some(12345),
            ..Default::default()
        };

        let mut exchange1 = test_exchange();
        let mut trader1 = funded_trader(&mut exchange1, config.clone());
        let mut exchange2 = test_exchange();
        let mut trader2 = funded_trader(&mut exchange2, config);

        for _ in 0..50 {
            trader1.on_tick(&mut exchange1);
            trader2.on_tick(&mut exchange2);
        }
        assert_eq!(
            exchange1.price(TradeMarket::TokenFiat),
            exchange2.price(TradeMarket::TokenFiat)
        );
        assert_eq!(exchange1.total_trades(), exchange2.total_trades());
    }
}
