//! Agent-based simulation of a spread-quoting market maker
//!
//! One market-making agent repeatedly quotes a bid and an ask around a
//! predicted future price inside a stepped exchange simulation, profiting
//! from a spread that shrinks over the life of each "bet". The exchange
//! holds three continuous double-auction books over three assets; agents
//! are stepped one discrete tick at a time with exclusive access to it.

pub mod application;
pub mod domain;

// Re-export key types at crate root
pub use application::agents::{
    Agent, AgentId, MarketMaker, MarketMakerConfig, RandomTrader, RandomTraderConfig,
};
pub use application::exchange::{Exchange, ExchangeConfig, ExchangeError, OrderBook, Wallet};
pub use application::simulation::{SimulationConfig, SimulationMetrics, SimulationRunner};
pub use domain::{Asset, OrderHandle, OrderId, Side, TradeMarket};
