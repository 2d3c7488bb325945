//! Application layer: agents, the exchange they trade on, and the
//! simulation loop that steps them.

pub mod agents;
pub mod exchange;
pub mod simulation;
