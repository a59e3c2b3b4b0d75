use crate::context::StrategyContext;
use async_trait::async_trait;
use chrono::{DateTime, Duration};
use core_types::{
    Candle, DayType, Direction, HunterZone, OptionChainSnapshot, OptionLeg, StrikeEntry, Timestamp,
};
use executor::{ExecutorError, OrderGateway, OrderHandle, SimulatedGateway};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signals::{EvwmaReading, IndicatorValues, VpaSignals};
use std::sync::Mutex;

pub(crate) const NIFTY: &str = "NSE_INDEX|Nifty 50";

pub(crate) fn ts(minute: i64) -> Timestamp {
    DateTime::parse_from_rfc3339("2024-03-01T10:00:00+05:30").unwrap() + Duration::minutes(minute)
}

fn leg(key: String) -> Option<OptionLeg> {
    Some(OptionLeg {
        instrument_key: key,
        open_interest: dec!(1000),
    })
}

pub(crate) struct Fixture {
    pub chain: OptionChainSnapshot,
    pub candles: Vec<Candle>,
}

impl Fixture {
    pub fn new() -> Self {
        let strikes = (0..13)
            .map(|i| {
                let strike = dec!(21700) + Decimal::from(i * 50);
                StrikeEntry {
                    strike_price: strike,
                    call: leg(format!("CE-{strike}")),
                    put: leg(format!("PE-{strike}")),
                }
            })
            .collect();
        let candles = (0..25)
            .map(|i| Candle {
                timestamp: ts(i - 25),
                open: dec!(22000),
                high: dec!(22010),
                low: dec!(21990),
                close: dec!(22000),
                volume: dec!(1000),
                open_interest: Decimal::ZERO,
            })
            .collect();
        Self {
            chain: OptionChainSnapshot {
                underlying: NIFTY.to_string(),
                expiry: None,
                strikes,
            },
            candles,
        }
    }

    pub fn ctx(&self, price: Decimal, score: i32) -> StrategyContext<'_> {
        let reading = Some(EvwmaReading {
            value: dec!(22000),
            slope: dec!(1),
        });
        StrategyContext {
            instrument: NIFTY,
            timestamp: ts(0),
            price,
            score,
            pcr: Some(dec!(1.3)),
            day_type: DayType::SidewaysBullTrap,
            hunter_zone: HunterZone {
                high: dec!(22100),
                low: dec!(21900),
            },
            option_chain: &self.chain,
            indicators: IndicatorValues {
                evwma_short: reading,
                evwma_long: reading,
                atr: Some(dec!(10)),
            },
            vpa: VpaSignals::default(),
            volume_confirmed: true,
            candles: &self.candles,
            strike_step: Some(dec!(50)),
            quantity: 1,
        }
    }
}

/// Rejects every order.
pub(crate) struct RejectingGateway;

impl RejectingGateway {
    fn reject(instrument: &str) -> ExecutorError {
        ExecutorError::OrderRejected {
            instrument: instrument.to_string(),
            reason: "rejected in test".to_string(),
        }
    }
}

#[async_trait]
impl OrderGateway for RejectingGateway {
    async fn place_entry(
        &self,
        instrument: &str,
        _direction: Direction,
        _quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        Err(Self::reject(instrument))
    }

    async fn place_exit(&self, instrument: &str, _quantity: u32) -> Result<OrderHandle, ExecutorError> {
        Err(Self::reject(instrument))
    }

    async fn place_protective_stop(
        &self,
        instrument: &str,
        _trigger_price: Decimal,
        _quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        Err(Self::reject(instrument))
    }

    async fn cancel(&self, handle: &OrderHandle) -> Result<(), ExecutorError> {
        Err(Self::reject(&handle.instrument))
    }

    async fn modify_stop(&self, handle: &OrderHandle, _trigger_price: Decimal) -> Result<(), ExecutorError> {
        Err(Self::reject(&handle.instrument))
    }

    async fn is_positioned(&self, _instrument: &str) -> bool {
        false
    }
}

/// A paper gateway that also remembers every order call in order.
#[derive(Default)]
pub(crate) struct RecordingGateway {
    inner: SimulatedGateway,
    calls: Mutex<Vec<String>>,
}

impl RecordingGateway {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderGateway for RecordingGateway {
    async fn place_entry(
        &self,
        instrument: &str,
        direction: Direction,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        self.record(format!("entry {instrument}"));
        self.inner.place_entry(instrument, direction, quantity).await
    }

    async fn place_exit(&self, instrument: &str, quantity: u32) -> Result<OrderHandle, ExecutorError> {
        self.record(format!("exit {instrument}"));
        self.inner.place_exit(instrument, quantity).await
    }

    async fn place_protective_stop(
        &self,
        instrument: &str,
        trigger_price: Decimal,
        quantity: u32,
    ) -> Result<OrderHandle, ExecutorError> {
        let handle = self
            .inner
            .place_protective_stop(instrument, trigger_price, quantity)
            .await?;
        self.record(format!("stop {}", handle.order_id));
        Ok(handle)
    }

    async fn cancel(&self, handle: &OrderHandle) -> Result<(), ExecutorError> {
        self.record(format!("cancel {}", handle.order_id));
        self.inner.cancel(handle).await
    }

    async fn modify_stop(&self, handle: &OrderHandle, trigger_price: Decimal) -> Result<(), ExecutorError> {
        self.record(format!("modify {}", handle.order_id));
        self.inner.modify_stop(handle, trigger_price).await
    }

    async fn is_positioned(&self, instrument: &str) -> bool {
        self.inner.is_positioned(instrument).await
    }
}
