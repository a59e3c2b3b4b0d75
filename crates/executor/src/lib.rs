//! # Confluence Executor Crate
//!
//! Order routing and position bookkeeping.
//!
//! - `OrderGateway`: the dual-mode order interface the templates and the stop-loss
//!   monitor issue entries, exits and protective stops through. `SimulatedGateway`
//!   acknowledges everything and keeps a mirror of open paper positions;
//!   `LiveGateway` forwards to a broker through `api_client::BrokerClient`.
//! - `PositionLedger`: at most one open position per instrument, plus the append-only
//!   list of closed trades.
//!
//! The ledger is owned by exactly one orchestrator and mutated through `&mut`, so every
//! read-then-decide-then-write on an instrument's record happens without interleaving.

pub mod error;
pub mod gateway;
pub mod ledger;

pub use error::ExecutorError;
pub use gateway::{LiveGateway, OrderGateway, OrderHandle, PaperPosition, SimulatedGateway};
pub use ledger::PositionLedger;
