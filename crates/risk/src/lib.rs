//! # Confluence Risk
//!
//! Protective stops: how far from entry they sit, and enforcing them on every new price.
//!
//! - `StopLossCalculator` places the stop one volatility buffer (template multiplier x ATR,
//!   or a fixed fraction of entry when ATR is undefined) beyond the recent swing extreme.
//! - `StopLossMonitor` closes a position through the order gateway once price crosses its
//!   stop. It is the only exit path that does not belong to a template.

pub mod error;
pub mod monitor;
pub mod stop_loss;

pub use error::RiskError;
pub use monitor::{StopLossMonitor, cancel_protective_stop};
pub use stop_loss::{StopLossCalculator, calculate_stop_loss, find_recent_swing};
