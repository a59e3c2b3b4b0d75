//! # Confluence Analytics
//!
//! Turns the closed trades of a session or a backtest into a `PerformanceReport`. It acts
//! as the "unbiased judge" of the templates.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** a pure logic crate that depends only on `core-types`.
//! - **Stateless Calculation:** `AnalyticsEngine` takes trades in and hands a report out.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the calculation logic.
//! - `PerformanceReport`: trade counts, win rate, PnL, profit factor, averages, max
//!   drawdown of the cumulative PnL curve and average holding period.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::PerformanceReport;
