use crate::orchestrator::StrategyOrchestrator;
use api_client::{ApiError, MarketDataProvider};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use configuration::{Config, InstrumentConfig};
use core_types::{Candle, HunterZone, OptionChainSnapshot, OptionLeg, StrikeEntry, Timestamp};
use executor::SimulatedGateway;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) const NIFTY: &str = "NSE_INDEX|Nifty 50";
pub(crate) const NIFTY_FUT: &str = "NSE_FO|NIFTY24MARFUT";

pub(crate) fn at(s: &str) -> Timestamp {
    DateTime::parse_from_rfc3339(s).unwrap()
}

pub(crate) fn config() -> Config {
    let mut config = Config::default();
    config.instruments = vec![InstrumentConfig {
        key: NIFTY.to_string(),
        underlying: NIFTY.to_string(),
        strike_step: Some(dec!(50)),
        volume_proxy: None,
        expiry: None,
    }];
    config.volume_analysis.enabled = false;
    config
}

pub(crate) fn zone() -> HunterZone {
    HunterZone {
        high: dec!(22100),
        low: dec!(21900),
    }
}

/// A steadily rising session from 09:15 that opens above `zone()`. Every bar is an
/// up-close with a range of 5 and volume 1000; the last close is 22109 + count.
pub(crate) fn rising_session(count: i64) -> Vec<Candle> {
    let start = at("2024-03-01T09:15:00+05:30");
    (0..count)
        .map(|i| {
            let close = dec!(22110) + Decimal::from(i);
            Candle {
                timestamp: start + Duration::minutes(i),
                open: close - dec!(1),
                high: close + dec!(2),
                low: close - dec!(3),
                close,
                volume: dec!(1000),
                open_interest: Decimal::ZERO,
            }
        })
        .collect()
}

/// The prior session's final hour, spanning 21900..22100.
pub(crate) fn prior_final_hour() -> Vec<Candle> {
    let start = at("2024-02-29T14:30:00+05:30");
    (0..60)
        .map(|i| Candle {
            timestamp: start + Duration::minutes(i),
            open: dec!(22000),
            high: if i == 10 { dec!(22100) } else { dec!(22050) },
            low: if i == 40 { dec!(21900) } else { dec!(21950) },
            close: dec!(22000),
            volume: dec!(1000),
            open_interest: Decimal::ZERO,
        })
        .collect()
}

/// Strikes 21900..22500 in steps of 50 with a PCR of `put_oi / call_oi`.
pub(crate) fn chain(call_oi: Decimal, put_oi: Decimal) -> OptionChainSnapshot {
    let strikes = (0..13)
        .map(|i| {
            let strike = dec!(21900) + Decimal::from(i * 50);
            StrikeEntry {
                strike_price: strike,
                call: Some(OptionLeg {
                    instrument_key: format!("CE-{strike}"),
                    open_interest: call_oi,
                }),
                put: Some(OptionLeg {
                    instrument_key: format!("PE-{strike}"),
                    open_interest: put_oi,
                }),
            }
        })
        .collect();
    OptionChainSnapshot {
        underlying: NIFTY.to_string(),
        expiry: None,
        strikes,
    }
}

pub(crate) fn bullish_chain() -> OptionChainSnapshot {
    chain(dec!(1000), dec!(1300))
}

/// Serves canned candles and a single option chain, and records every request.
#[derive(Default)]
pub(crate) struct FakeMarket {
    pub candles: HashMap<String, Vec<Candle>>,
    pub history: HashMap<String, Vec<Candle>>,
    pub chain: OptionChainSnapshot,
    pub expiry: Option<NaiveDate>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeMarket {
    fn log(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarket {
    async fn get_candles(&self, instrument: &str, _interval: &str) -> Result<Vec<Candle>, ApiError> {
        self.log(format!("candles {instrument}"));
        self.candles
            .get(instrument)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(instrument.to_string()))
    }

    async fn get_historical_candles(
        &self,
        instrument: &str,
        _interval: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Candle>, ApiError> {
        self.log(format!("history {instrument} {from} {to}"));
        Ok(self
            .history
            .get(instrument)
            .map(|candles| {
                candles
                    .iter()
                    .filter(|c| (from..=to).contains(&c.timestamp.date_naive()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn nearest_expiry(&self, underlying: &str) -> Result<Option<NaiveDate>, ApiError> {
        self.log(format!("expiry {underlying}"));
        Ok(self.expiry)
    }

    async fn get_option_chain(
        &self,
        underlying: &str,
        expiry: Option<NaiveDate>,
    ) -> Result<OptionChainSnapshot, ApiError> {
        self.log(format!("chain {underlying} {expiry:?}"));
        Ok(self.chain.clone())
    }
}

pub(crate) fn orchestrator(
    config: Config,
    market: Arc<FakeMarket>,
) -> (StrategyOrchestrator, Arc<SimulatedGateway>) {
    let gateway = Arc::new(SimulatedGateway::new());
    let orchestrator = StrategyOrchestrator::new(config, market, gateway.clone()).unwrap();
    (orchestrator, gateway)
}
