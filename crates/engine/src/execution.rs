use crate::error::EngineError;
use api_client::BrokerClient;
use configuration::Execution;
use executor::{LiveGateway, OrderGateway, SimulatedGateway};
use std::sync::Arc;

/// The order route selected by `execution.paper_trading`.
#[derive(Clone)]
pub enum ExecutionMode {
    /// Orders fill against the local paper mirror.
    Paper(Arc<SimulatedGateway>),
    Live(Arc<LiveGateway>),
}

impl ExecutionMode {
    /// Paper trading ignores `broker`; live trading cannot start without one.
    pub fn from_config(
        execution: &Execution,
        broker: Option<Arc<dyn BrokerClient>>,
    ) -> Result<Self, EngineError> {
        if execution.paper_trading {
            tracing::info!("Paper trading enabled. Orders fill against the simulated gateway.");
            return Ok(Self::Paper(Arc::new(SimulatedGateway::new())));
        }
        let broker = broker.ok_or_else(|| {
            EngineError::Configuration(
                "execution.paper_trading is off but no broker client is available".to_string(),
            )
        })?;
        tracing::warn!("Live trading enabled. Orders are routed to the broker.");
        Ok(Self::Live(Arc::new(LiveGateway::new(broker))))
    }

    pub fn gateway(&self) -> Arc<dyn OrderGateway> {
        match self {
            Self::Paper(gateway) => gateway.clone(),
            Self::Live(gateway) => gateway.clone(),
        }
    }

    /// The paper mirror the drivers reconcile against at start-up.
    pub fn paper_mirror(&self) -> Option<Arc<SimulatedGateway>> {
        match self {
            Self::Paper(gateway) => Some(gateway.clone()),
            Self::Live(_) => None,
        }
    }
}
