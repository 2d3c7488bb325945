//! Stepped simulation loop.

mod runner;

pub use runner::{SimulationConfig, SimulationMetrics, SimulationRunner};
