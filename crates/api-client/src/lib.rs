//! # Confluence API Client
//!
//! The interfaces of the two external collaborators the core talks to: a
//! `MarketDataProvider` for candles and option chains, and a `BrokerClient` for order
//! transport. Authentication, HTTP plumbing and instrument-master handling live behind
//! these traits; the engine and backtester only ever see the traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Candle, OptionChainSnapshot, OrderRequest};
use rust_decimal::Decimal;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::ApiError;
pub use responses::{OrderResponse, OrderStatus};

/// Source of already-parsed market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// The current session's candles at `interval` (e.g. "1minute"), oldest first.
    async fn get_candles(&self, instrument: &str, interval: &str) -> Result<Vec<Candle>, ApiError>;

    /// Candles between two dates inclusive, oldest first.
    async fn get_historical_candles(
        &self,
        instrument: &str,
        interval: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, ApiError>;

    /// The nearest listed expiry for the underlying, if any.
    async fn nearest_expiry(&self, underlying: &str) -> Result<Option<NaiveDate>, ApiError>;

    /// Option chain snapshot for the underlying. `None` asks for whatever expiry the
    /// provider considers current.
    async fn get_option_chain(
        &self,
        underlying: &str,
        expiry: Option<NaiveDate>,
    ) -> Result<OptionChainSnapshot, ApiError>;
}

/// Order transport to the broker. (Authenticated)
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Places a regular order.
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError>;

    /// Places a good-till-triggered order; used for protective stops.
    async fn place_gtt_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError>;

    async fn cancel_order(&self, order_id: &str) -> Result<OrderResponse, ApiError>;

    /// Moves the trigger price of a resting order.
    async fn modify_order(
        &self,
        order_id: &str,
        trigger_price: Decimal,
    ) -> Result<OrderResponse, ApiError>;
}
