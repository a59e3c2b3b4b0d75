use crate::error::ExecutorError;
use api_client::{BrokerClient, OrderResponse};
use async_trait::async_trait;
use core_types::{Direction, OrderRequest, OrderSide};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Identifies an order the gateway accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHandle {
    pub order_id: String,
    pub instrument: String,
}

/// The order interface used by templates and the stop-loss monitor.
///
/// Every method either reports the order as accepted or fails atomically; callers only
/// mutate the ledger after an `Ok`.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Buys `quantity` of `instrument`, the option chosen for `direction`.
    async fn place_entry(
        &self,
        instrument: &str,
        direction: Direction,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError>;

    /// Sells an option bought by `place_entry`.
    async fn place_exit(&self, instrument: &str, quantity: u32)
    -> Result<OrderHandle, ExecutorError>;

    async fn place_protective_stop(
        &self,
        instrument: &str,
        trigger_price: Decimal,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError>;

    async fn cancel(&self, handle: &OrderHandle) -> Result<(), ExecutorError>;

    /// Moves the trigger of a protective stop placed earlier.
    async fn modify_stop(
        &self,
        handle: &OrderHandle,
        trigger_price: Decimal,
    ) -> Result<(), ExecutorError>;

    async fn is_positioned(&self, instrument: &str) -> bool;
}

/// A paper position as the simulated gateway remembers it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperPosition {
    pub instrument: String,
    pub direction: Direction,
    pub quantity: u32,
    pub entry_order_id: String,
    pub stop_price: Option<Decimal>,
}

#[derive(Debug, Default)]
struct PaperBook {
    positions: HashMap<String, PaperPosition>,
    /// Stop order id -> instrument it protects.
    stops: HashMap<String, String>,
}

/// Acknowledges every order locally and mirrors the resulting paper positions.
#[derive(Debug, Default)]
pub struct SimulatedGateway {
    book: Mutex<PaperBook>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the mirror, ordered by instrument.
    pub async fn paper_positions(&self) -> Vec<PaperPosition> {
        let book = self.book.lock().await;
        let mut positions: Vec<_> = book.positions.values().cloned().collect();
        positions.sort_by(|a, b| a.instrument.cmp(&b.instrument));
        positions
    }

    fn next_order_id() -> String {
        format!("paper-{}", Uuid::new_v4().simple())
    }
}

#[async_trait]
impl OrderGateway for SimulatedGateway {
    async fn place_entry(
        &self,
        instrument: &str,
        direction: Direction,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        let mut book = self.book.lock().await;
        if book.positions.contains_key(instrument) {
            return Err(ExecutorError::OrderRejected {
                instrument: instrument.to_string(),
                reason: "paper position already open".to_string(),
            });
        }

        let order_id = Self::next_order_id();
        book.positions.insert(
            instrument.to_string(),
            PaperPosition {
                instrument: instrument.to_string(),
                direction,
                quantity,
                entry_order_id: order_id.clone(),
                stop_price: None,
            },
        );
        tracing::debug!(instrument, %direction, quantity, order_id, "Paper entry filled");

        Ok(OrderHandle {
            order_id,
            instrument: instrument.to_string(),
        })
    }

    async fn place_exit(
        &self,
        instrument: &str,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        let mut book = self.book.lock().await;
        if book.positions.remove(instrument).is_none() {
            return Err(ExecutorError::PositionNotFound(instrument.to_string()));
        }
        book.stops.retain(|_, protected| protected != instrument);

        let order_id = Self::next_order_id();
        tracing::debug!(instrument, quantity, order_id, "Paper exit filled");
        Ok(OrderHandle {
            order_id,
            instrument: instrument.to_string(),
        })
    }

    async fn place_protective_stop(
        &self,
        instrument: &str,
        trigger_price: Decimal,
        _quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        let mut book = self.book.lock().await;
        let position = book
            .positions
            .get_mut(instrument)
            .ok_or_else(|| ExecutorError::PositionNotFound(instrument.to_string()))?;
        position.stop_price = Some(trigger_price);

        let order_id = Self::next_order_id();
        book.stops.insert(order_id.clone(), instrument.to_string());
        tracing::debug!(instrument, %trigger_price, order_id, "Paper stop placed");

        Ok(OrderHandle {
            order_id,
            instrument: instrument.to_string(),
        })
    }

    async fn cancel(&self, handle: &OrderHandle) -> Result<(), ExecutorError> {
        let mut book = self.book.lock().await;
        let instrument = book
            .stops
            .remove(&handle.order_id)
            .ok_or_else(|| ExecutorError::OrderNotFound(handle.order_id.clone()))?;
        if let Some(position) = book.positions.get_mut(&instrument) {
            position.stop_price = None;
        }
        Ok(())
    }

    async fn modify_stop(
        &self,
        handle: &OrderHandle,
        trigger_price: Decimal,
    ) -> Result<(), ExecutorError> {
        let mut book = self.book.lock().await;
        let instrument = book
            .stops
            .get(&handle.order_id)
            .cloned()
            .ok_or_else(|| ExecutorError::OrderNotFound(handle.order_id.clone()))?;
        if let Some(position) = book.positions.get_mut(&instrument) {
            position.stop_price = Some(trigger_price);
        }
        Ok(())
    }

    async fn is_positioned(&self, instrument: &str) -> bool {
        self.book.lock().await.positions.contains_key(instrument)
    }
}

/// Routes orders to the broker.
pub struct LiveGateway {
    broker: Arc<dyn BrokerClient>,
    /// Instruments entered through this gateway and not yet exited.
    positioned: Mutex<HashSet<String>>,
}

impl LiveGateway {
    pub fn new(broker: Arc<dyn BrokerClient>) -> Self {
        Self {
            broker,
            positioned: Mutex::new(HashSet::new()),
        }
    }

    fn accept(instrument: &str, response: OrderResponse) -> Result<OrderHandle, ExecutorError> {
        if !response.is_success() {
            return Err(ExecutorError::OrderRejected {
                instrument: instrument.to_string(),
                reason: response
                    .message
                    .unwrap_or_else(|| "broker returned an error status".to_string()),
            });
        }
        Ok(OrderHandle {
            order_id: response.order_id,
            instrument: instrument.to_string(),
        })
    }
}

#[async_trait]
impl OrderGateway for LiveGateway {
    async fn place_entry(
        &self,
        instrument: &str,
        direction: Direction,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        let order = OrderRequest::market(instrument, OrderSide::Buy, quantity, "entry");
        tracing::info!(instrument, %direction, quantity, "Placing live entry order");
        let response = self.broker.place_order(&order).await?;
        let handle = Self::accept(instrument, response)?;
        self.positioned.lock().await.insert(instrument.to_string());
        Ok(handle)
    }

    async fn place_exit(
        &self,
        instrument: &str,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        let order = OrderRequest::market(instrument, OrderSide::Sell, quantity, "exit");
        tracing::info!(instrument, quantity, "Placing live exit order");
        let response = self.broker.place_order(&order).await?;
        let handle = Self::accept(instrument, response)?;
        self.positioned.lock().await.remove(instrument);
        Ok(handle)
    }

    async fn place_protective_stop(
        &self,
        instrument: &str,
        trigger_price: Decimal,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        let order = OrderRequest::protective_stop(instrument, trigger_price, quantity);
        let response = self.broker.place_gtt_order(&order).await?;
        Self::accept(instrument, response)
    }

    async fn cancel(&self, handle: &OrderHandle) -> Result<(), ExecutorError> {
        let response = self.broker.cancel_order(&handle.order_id).await?;
        Self::accept(&handle.instrument, response).map(|_| ())
    }

    async fn modify_stop(
        &self,
        handle: &OrderHandle,
        trigger_price: Decimal,
    ) -> Result<(), ExecutorError> {
        let response = self
            .broker
            .modify_order(&handle.order_id, trigger_price)
            .await?;
        Self::accept(&handle.instrument, response).map(|_| ())
    }

    async fn is_positioned(&self, instrument: &str) -> bool {
        self.positioned.lock().await.contains(instrument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::{ApiError, OrderStatus};
    use rust_decimal_macros::dec;

    const OPTION: &str = "NSE_FO|NIFTY24MAR22000CE";

    #[tokio::test]
    async fn paper_mirror_tracks_entry_stop_and_exit() {
        let gateway = SimulatedGateway::new();
        gateway.place_entry(OPTION, Direction::Bull, 1).await.unwrap();
        assert!(gateway.is_positioned(OPTION).await);

        let stop = gateway
            .place_protective_stop(OPTION, dec!(21950), 1)
            .await
            .unwrap();
        assert_eq!(gateway.paper_positions().await[0].stop_price, Some(dec!(21950)));

        gateway.modify_stop(&stop, dec!(21980)).await.unwrap();
        assert_eq!(gateway.paper_positions().await[0].stop_price, Some(dec!(21980)));

        gateway.place_exit(OPTION, 1).await.unwrap();
        assert!(!gateway.is_positioned(OPTION).await);
        assert!(gateway.paper_positions().await.is_empty());
        assert!(matches!(
            gateway.cancel(&stop).await,
            Err(ExecutorError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn paper_gateway_rejects_double_entry() {
        let gateway = SimulatedGateway::new();
        gateway.place_entry(OPTION, Direction::Bull, 1).await.unwrap();
        let second = gateway.place_entry(OPTION, Direction::Bull, 1).await;
        assert!(matches!(second, Err(ExecutorError::OrderRejected { .. })));
        assert_eq!(gateway.paper_positions().await.len(), 1);
    }

    #[tokio::test]
    async fn paper_stop_needs_an_open_position() {
        let gateway = SimulatedGateway::new();
        let result = gateway.place_protective_stop(OPTION, dec!(100), 1).await;
        assert!(matches!(result, Err(ExecutorError::PositionNotFound(_))));
    }

    #[tokio::test]
    async fn cancelling_a_stop_clears_the_trigger() {
        let gateway = SimulatedGateway::new();
        gateway.place_entry(OPTION, Direction::Bear, 2).await.unwrap();
        let stop = gateway
            .place_protective_stop(OPTION, dec!(22100), 2)
            .await
            .unwrap();
        gateway.cancel(&stop).await.unwrap();
        assert_eq!(gateway.paper_positions().await[0].stop_price, None);
    }

    struct RejectingBroker;

    #[async_trait]
    impl BrokerClient for RejectingBroker {
        async fn place_order(&self, _order: &OrderRequest) -> Result<OrderResponse, ApiError> {
            Ok(OrderResponse {
                order_id: String::new(),
                status: OrderStatus::Error,
                message: Some("insufficient margin".to_string()),
            })
        }

        async fn place_gtt_order(&self, _order: &OrderRequest) -> Result<OrderResponse, ApiError> {
            Err(ApiError::Transport("connection reset".to_string()))
        }

        async fn cancel_order(&self, order_id: &str) -> Result<OrderResponse, ApiError> {
            Ok(OrderResponse::accepted(order_id))
        }

        async fn modify_order(
            &self,
            order_id: &str,
            _trigger_price: Decimal,
        ) -> Result<OrderResponse, ApiError> {
            Ok(OrderResponse::accepted(order_id))
        }
    }

    #[tokio::test]
    async fn live_gateway_surfaces_broker_rejections() {
        let gateway = LiveGateway::new(Arc::new(RejectingBroker));

        let entry = gateway.place_entry(OPTION, Direction::Bull, 1).await;
        assert!(matches!(entry, Err(ExecutorError::OrderRejected { .. })));
        assert!(!gateway.is_positioned(OPTION).await);

        let stop = gateway.place_protective_stop(OPTION, dec!(100), 1).await;
        assert!(matches!(stop, Err(ExecutorError::Api(_))));
    }
}
