//! Agent Framework
//!
//! Traits and types for the participants of the stepped simulation.
//!
//! # Agent Types
//!
//! - **MarketMaker**: quotes a bid/ask pair around a predicted price and
//!   lets the spread shrink over the life of each bet
//! - **RandomTrader**: random taker flow providing baseline volume

mod agent;

pub use agent::{Agent, AgentId};

// Agent implementations
pub mod market_maker;
pub mod random_trader;

// Re-export agent types and configs
pub use market_maker::{MarketMaker, MarketMakerConfig};
pub use random_trader::{RandomTrader, RandomTraderConfig};
