use crate::error::BacktestError;
use api_client::{ApiError, MarketDataProvider};
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Candle, OptionChainSnapshot, Timestamp};
use std::collections::HashMap;
use std::path::Path;

/// One candle in the master chronological stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEvent {
    pub instrument: String,
    pub candle: Candle,
}

impl MarketEvent {
    pub fn timestamp(&self) -> Timestamp {
        self.candle.timestamp
    }
}

/// A fully loaded data set served through the live provider interface.
///
/// Each underlying has a single option-chain snapshot that is returned for every request.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    candles: HashMap<String, Vec<Candle>>,
    chains: HashMap<String, OptionChainSnapshot>,
}

impl InMemoryMarketData {
    /// Sorts every series by time and rejects inconsistent candles.
    pub fn new(
        candles: HashMap<String, Vec<Candle>>,
        chains: Vec<OptionChainSnapshot>,
    ) -> Result<Self, BacktestError> {
        let mut candles = candles;
        for (instrument, series) in candles.iter_mut() {
            series.sort_by_key(|c| c.timestamp);
            for candle in series.iter() {
                candle
                    .validate()
                    .map_err(|e| BacktestError::InvalidData(format!("{instrument}: {e}")))?;
            }
        }
        let chains = chains
            .into_iter()
            .map(|chain| (chain.underlying.clone(), chain))
            .collect();
        Ok(Self { candles, chains })
    }

    /// Candles as a JSON object of instrument key to candle array; chains as a JSON array
    /// of snapshots.
    pub fn from_json(candles_json: &str, chains_json: &str) -> Result<Self, BacktestError> {
        let candles: HashMap<String, Vec<Candle>> = serde_json::from_str(candles_json)?;
        let chains: Vec<OptionChainSnapshot> = serde_json::from_str(chains_json)?;
        Self::new(candles, chains)
    }

    pub fn load(
        candles_path: impl AsRef<Path>,
        chains_path: impl AsRef<Path>,
    ) -> Result<Self, BacktestError> {
        let candles = std::fs::read_to_string(candles_path)?;
        let chains = std::fs::read_to_string(chains_path)?;
        let data = Self::from_json(&candles, &chains)?;
        tracing::info!(
            instruments = data.candles.len(),
            chains = data.chains.len(),
            "Loaded backtest data set"
        );
        Ok(data)
    }

    /// Every candle dated within `from..=to`, across all instruments, sorted by time.
    /// Candles sharing a timestamp keep instrument-key order.
    pub fn merged_stream(&self, from: NaiveDate, to: NaiveDate) -> Vec<MarketEvent> {
        let mut events: Vec<MarketEvent> = self
            .candles
            .iter()
            .flat_map(|(instrument, series)| {
                series
                    .iter()
                    .filter(|c| (from..=to).contains(&c.timestamp.date_naive()))
                    .map(|candle| MarketEvent {
                        instrument: instrument.clone(),
                        candle: candle.clone(),
                    })
            })
            .collect();
        events.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then_with(|| a.instrument.cmp(&b.instrument))
        });
        events
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryMarketData {
    async fn get_candles(&self, instrument: &str, _interval: &str) -> Result<Vec<Candle>, ApiError> {
        self.candles
            .get(instrument)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("candles for {instrument}")))
    }

    async fn get_historical_candles(
        &self,
        instrument: &str,
        _interval: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, ApiError> {
        let series = self
            .candles
            .get(instrument)
            .ok_or_else(|| ApiError::NotFound(format!("candles for {instrument}")))?;
        Ok(series
            .iter()
            .filter(|c| (from..=to).contains(&c.timestamp.date_naive()))
            .cloned()
            .collect())
    }

    async fn nearest_expiry(&self, underlying: &str) -> Result<Option<NaiveDate>, ApiError> {
        Ok(self.chains.get(underlying).and_then(|c| c.expiry))
    }

    async fn get_option_chain(
        &self,
        underlying: &str,
        _expiry: Option<NaiveDate>,
    ) -> Result<OptionChainSnapshot, ApiError> {
        self.chains
            .get(underlying)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("option chain for {underlying}")))
    }
}
