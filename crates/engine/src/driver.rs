use crate::error::EngineError;
use crate::orchestrator::StrategyOrchestrator;
use crate::reconciler::Discrepancy;
use crate::CANDLE_INTERVAL;
use api_client::MarketDataProvider;
use chrono::{FixedOffset, NaiveDate, Utc};
use configuration::Session;
use core_types::Timestamp;
use executor::SimulatedGateway;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

enum Wake {
    Poll,
    Shutdown,
}

/// Drives decision cycles on a fixed polling interval during market hours.
pub struct PollingDriver {
    orchestrator: StrategyOrchestrator,
    provider: Arc<dyn MarketDataProvider>,
    session: Session,
    offset: FixedOffset,
    shutdown: watch::Receiver<bool>,
    /// The date the current hunter zones were computed for.
    zones_for: Option<NaiveDate>,
    paper_mirror: Option<Arc<SimulatedGateway>>,
}

impl PollingDriver {
    pub fn new(
        orchestrator: StrategyOrchestrator,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, EngineError> {
        let session = orchestrator.config().session.clone();
        let offset = session.utc_offset().ok_or_else(|| {
            EngineError::Configuration(format!(
                "invalid utc offset of {} minutes",
                session.utc_offset_minutes
            ))
        })?;
        Ok(Self {
            provider: orchestrator.provider(),
            orchestrator,
            session,
            offset,
            shutdown,
            zones_for: None,
            paper_mirror: None,
        })
    }

    /// The paper gateway to reconcile against when `run` starts.
    pub fn with_paper_mirror(mut self, mirror: Option<Arc<SimulatedGateway>>) -> Self {
        self.paper_mirror = mirror;
        self
    }

    pub async fn reconcile_on_startup(&self) -> Vec<Discrepancy> {
        match &self.paper_mirror {
            Some(mirror) => self.orchestrator.reconcile(&mirror.paper_positions().await),
            None => Vec::new(),
        }
    }

    /// Polls until the shutdown signal fires, then hands the orchestrator back so the
    /// caller can inspect or reconcile the final state.
    pub async fn run(mut self) -> StrategyOrchestrator {
        tracing::info!(
            interval_secs = self.session.poll_interval_secs,
            "Starting polling driver..."
        );
        let discrepancies = self.reconcile_on_startup().await;
        if !discrepancies.is_empty() {
            tracing::warn!(count = discrepancies.len(), "Ledger and paper mirror disagree at start-up");
        }
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.session.poll_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *self.shutdown.borrow() {
                break;
            }
            let wake = tokio::select! {
                _ = self.shutdown.changed() => Wake::Shutdown,
                _ = ticker.tick() => Wake::Poll,
            };
            match wake {
                Wake::Shutdown => break,
                Wake::Poll => {
                    let now = Utc::now().with_timezone(&self.offset);
                    self.poll_once(now).await;
                }
            }
        }

        tracing::info!("Shutdown requested. Polling driver stopped.");
        self.orchestrator
    }

    /// One polling pass at `now`: refresh hunter zones on a new date, then run a decision
    /// cycle for every tracked instrument. Failures are logged per instrument.
    pub async fn poll_once(&mut self, now: Timestamp) {
        if !self.session.is_market_hours(now.time()) {
            tracing::debug!(time = %now.time(), "Outside market hours");
            return;
        }

        let today = now.date_naive();
        if self.zones_for != Some(today) {
            self.orchestrator.calculate_hunter_zone(today).await;
            self.zones_for = Some(today);
        }

        let instruments = self.orchestrator.config().instruments.clone();
        // Proxies first, so their volume is cached before the instruments that need it.
        for proxy in instruments.iter().filter_map(|i| i.volume_proxy.as_deref()) {
            match self.provider.get_candles(proxy, CANDLE_INTERVAL).await {
                Ok(candles) => {
                    if let Some(latest) = candles.last() {
                        self.orchestrator.record_volume(proxy, latest.volume);
                    }
                }
                Err(e) => tracing::warn!(proxy, error = %e, "Failed to fetch proxy candles"),
            }
        }

        for instrument in &instruments {
            let key = instrument.key.as_str();
            let candles = match self.provider.get_candles(key, CANDLE_INTERVAL).await {
                Ok(candles) => candles,
                Err(e) => {
                    tracing::warn!(instrument = key, error = %e, "Failed to fetch candles");
                    continue;
                }
            };
            if let Err(e) = self
                .orchestrator
                .execute_strategy(key, &candles, now, None)
                .await
            {
                tracing::error!(instrument = key, error = %e, "Decision cycle failed");
            }
        }
    }

    pub fn orchestrator(&self) -> &StrategyOrchestrator {
        &self.orchestrator
    }
}
