//! # Confluence Engine
//!
//! Wires the signal calculators, the tactical templates, the stop-loss monitor and the
//! order gateway into decision cycles.
//!
//! - `StrategyOrchestrator` owns every piece of per-instrument state (hunter zones,
//!   last-processed candle, proxy volumes, the position ledger) and runs one cycle per
//!   instrument per new candle.
//! - `PollingDriver` fetches the latest candles on a fixed interval during market hours.
//! - `TickDriver` aggregates pushed ticks into one-minute candles, checks stops on every
//!   tick and runs a cycle when a minute rolls over.
//! - `StateReconciler` compares the ledger with the paper-position mirror.
//!
//! Both drivers reconcile the ledger against the paper mirror when they start, and stop
//! cleanly on a `tokio::sync::watch` shutdown signal after the cycle in flight has
//! finished.

pub mod driver;
pub mod error;
pub mod execution;
pub mod orchestrator;
pub mod reconciler;
pub mod tick;

#[cfg(test)]
mod test_support;

pub use driver::PollingDriver;
pub use error::EngineError;
pub use execution::ExecutionMode;
pub use orchestrator::{StrategyOrchestrator, hunter_zone_from_candles, session_open};
pub use reconciler::{Discrepancy, StateReconciler};
pub use tick::{CandleAggregator, TickDriver};

/// Candle interval requested from the market-data provider.
pub const CANDLE_INTERVAL: &str = "1minute";
