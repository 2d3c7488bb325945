//! Simulation Runner
//!
//! The core event loop that coordinates agents and the exchange.

use std::collections::HashMap;

use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::agents::Agent;
use crate::application::exchange::{Exchange, ExchangeConfig, Wallet};
use crate::domain::TradeMarket;

/// Configuration for the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of ticks to simulate
    pub num_ticks: u64,
    /// Exchange parameters (fees, opening prices)
    pub exchange: ExchangeConfig,
    /// Log a progress line every 100 ticks
    pub verbose: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_ticks: 1000,
            exchange: ExchangeConfig::default(),
            verbose: false,
        }
    }
}

/// Simulation metrics aggregated over the run
#[derive(Debug, Clone, Default)]
pub struct SimulationMetrics {
    /// Total ticks processed
    pub total_ticks: u64,
    /// Total trades executed
    pub total_trades: u64,
    /// Base-asset volume traded per market
    pub volume_by_market: HashMap<TradeMarket, Decimal>,
    /// Closing trade price per market
    pub final_prices: HashMap<TradeMarket, Decimal>,
}

/// The simulation runner steps every agent once per tick, in sequence,
/// then records each book's closing price into its history.
pub struct SimulationRunner {
    config: SimulationConfig,
    exchange: Exchange,
    agents: Vec<Box<dyn Agent>>,
    tick: u64,
}

impl SimulationRunner {
    /// Create a new simulation runner
    pub fn new(config: SimulationConfig) -> Self {
        let exchange = Exchange::new(config.exchange.clone());
        Self {
            config,
            exchange,
            agents: Vec::new(),
            tick: 0,
        }
    }

    /// Add an agent to the simulation with its starting balances.
    pub fn add_agent(&mut self, agent: Box<dyn Agent>, wallet: Wallet) {
        self.exchange.open_account(agent.id().clone(), wallet);
        self.agents.push(agent);
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn exchange_mut(&mut self) -> &mut Exchange {
        &mut self.exchange
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Run a single tick of the simulation
    pub fn tick(&mut self) {
        // Agents run one at a time with exclusive access; every call an
        // agent makes completes before the next agent is stepped.
        for agent in &mut self.agents {
            agent.on_tick(&mut self.exchange);
        }

        // Close the tick: each book's trade price becomes history
        self.exchange.record_prices();
        self.tick += 1;

        if self.config.verbose && self.tick % 100 == 0 {
            debug!(
                "tick {}: price={}, trades={}",
                self.tick,
                self.exchange.price(TradeMarket::TokenFiat),
                self.exchange.total_trades()
            );
        }
    }

    /// Run the full simulation
    pub fn run(&mut self) -> SimulationMetrics {
        for _ in 0..self.config.num_ticks {
            self.tick();
        }

        let metrics = self.metrics();
        info!(
            "simulation finished: {} ticks, {} trades",
            metrics.total_ticks, metrics.total_trades
        );
        metrics
    }

    /// Snapshot the aggregated metrics
    pub fn metrics(&self) -> SimulationMetrics {
        let mut volume_by_market = HashMap::new();
        let mut final_prices = HashMap::new();
        for market in TradeMarket::ALL {
            volume_by_market.insert(market, self.exchange.traded_volume(market));
            final_prices.insert(market, self.exchange.price(market));
        }
        SimulationMetrics {
            total_ticks: self.tick,
            total_trades: self.exchange.total_trades(),
            volume_by_market,
            final_prices,
        }
    }
}
