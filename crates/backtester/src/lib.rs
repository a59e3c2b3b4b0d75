//! # Confluence Backtester
//!
//! Replays a recorded data set through the same `StrategyOrchestrator` the live engine
//! uses, with a `SimulatedGateway` standing in for the broker.
//!
//! The candles of every instrument are merged into one chronological stream (the
//! "Master Clock"). Hunter zones are recomputed at the first candle of each date, each
//! instrument's series restarts with every session, and untracked instruments only feed
//! the proxy-volume cache. Positions still open at the end are reported, not closed.

use analytics::{AnalyticsEngine, PerformanceReport};
use chrono::NaiveDate;
use configuration::Config;
use core_types::{Candle, Position, Trade};
use engine::{Discrepancy, StrategyOrchestrator};
use executor::SimulatedGateway;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Arc;

pub mod data_handler;
pub mod error;

pub use data_handler::{InMemoryMarketData, MarketEvent};
pub use error::BacktestError;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub open_positions: Vec<Position>,
    pub report: PerformanceReport,
    /// Ledger vs. paper-mirror mismatches found after the last candle.
    pub discrepancies: Vec<Discrepancy>,
}

/// The main backtesting engine.
pub struct Backtester {
    config: Config,
    data: Arc<InMemoryMarketData>,
    analytics_engine: AnalyticsEngine,
    show_progress: bool,
}

impl Backtester {
    pub fn new(config: Config, data: InMemoryMarketData) -> Self {
        Self {
            config,
            data: Arc::new(data),
            analytics_engine: AnalyticsEngine::new(),
            show_progress: false,
        }
    }

    /// Draws a progress bar on stderr while replaying.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Replays every candle dated within `from..=to`.
    pub async fn run(&self, from: NaiveDate, to: NaiveDate) -> Result<BacktestResult, BacktestError> {
        if from > to {
            return Err(BacktestError::InvalidRange { from, to });
        }
        let events = self.data.merged_stream(from, to);
        if events.is_empty() {
            return Err(BacktestError::DataUnavailable);
        }

        let gateway = Arc::new(SimulatedGateway::new());
        let mut orchestrator =
            StrategyOrchestrator::new(self.config.clone(), self.data.clone(), gateway.clone())?;
        let session = &self.config.session;

        let progress_bar = self.progress_bar(events.len())?;
        let mut histories: HashMap<String, Vec<Candle>> = HashMap::new();
        let mut zones_for: Option<NaiveDate> = None;

        for event in &events {
            progress_bar.inc(1);
            let timestamp = event.timestamp();
            let date = timestamp.date_naive();

            if zones_for != Some(date) {
                orchestrator.calculate_hunter_zone(date).await;
                zones_for = Some(date);
            }

            let history = histories.entry(event.instrument.clone()).or_default();
            if history.last().is_some_and(|c| c.timestamp.date_naive() != date) {
                history.clear();
            }
            history.push(event.candle.clone());

            if !orchestrator.is_tracked(&event.instrument) {
                orchestrator.record_volume(&event.instrument, event.candle.volume);
                continue;
            }
            if !session.is_market_hours(timestamp.time()) {
                continue;
            }

            if let Err(e) = orchestrator
                .execute_strategy(&event.instrument, history, timestamp, None)
                .await
            {
                tracing::warn!(instrument = %event.instrument, at = %timestamp, error = %e, "Decision cycle failed");
            }
        }

        progress_bar.finish_with_message("Simulation complete. Analyzing results...");

        let discrepancies = orchestrator.reconcile(&gateway.paper_positions().await);
        let (open_positions, trades) = orchestrator.into_ledger().into_parts();
        let report = self.analytics_engine.calculate(&trades)?;

        tracing::info!(
            trades = trades.len(),
            open = open_positions.len(),
            pnl = %report.total_pnl,
            "Backtest finished"
        );
        Ok(BacktestResult {
            trades,
            open_positions,
            report,
            discrepancies,
        })
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar, BacktestError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        Ok(bar)
    }
}
