use crate::error::SignalError;
use chrono::{Duration, Timelike};
use configuration::{MicrostructureParams, StopLossParams};
use core_types::Candle;
use rust_decimal::prelude::*;
use ta::indicators::AverageTrueRange;
use ta::Next as _;

/// The latest value of a volume-weighted moving average and its change from the bar before.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvwmaReading {
    pub value: Decimal,
    pub slope: Decimal,
}

/// Indicator values for one decision cycle. `None` means there was not enough history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorValues {
    /// EVWMA over the 1-minute series.
    pub evwma_short: Option<EvwmaReading>,
    /// EVWMA over the resampled long-timeframe series.
    pub evwma_long: Option<EvwmaReading>,
    pub atr: Option<Decimal>,
}

impl IndicatorValues {
    pub fn compute(
        candles: &[Candle],
        micro: &MicrostructureParams,
        stops: &StopLossParams,
    ) -> Result<Self, SignalError> {
        let long_series = resample(candles, micro.long_timeframe_minutes);
        Ok(Self {
            evwma_short: evwma(candles, micro.evwma_length),
            evwma_long: evwma(&long_series, micro.evwma_length),
            atr: atr(candles, stops.atr_period)?,
        })
    }
}

fn vwma(window: &[Candle]) -> Option<Decimal> {
    let (weighted, volume) = window
        .iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(w, v), c| {
            (w + c.close * c.volume, v + c.volume)
        });
    if volume.is_zero() {
        return None;
    }
    Some(weighted / volume)
}

/// Volume-weighted average of the last `length` closes, with its slope against the
/// window one bar earlier. Needs `length + 1` candles.
pub fn evwma(candles: &[Candle], length: usize) -> Option<EvwmaReading> {
    let n = candles.len();
    if length == 0 || n < length + 1 {
        return None;
    }
    let value = vwma(&candles[n - length..])?;
    let previous = vwma(&candles[n - length - 1..n - 1])?;
    Some(EvwmaReading {
        value,
        slope: value - previous,
    })
}

/// Aggregates candles into `minutes`-wide bars aligned to wall-clock boundaries
/// (09:15, 09:20, ... for five minutes). Input must be in time order.
pub fn resample(candles: &[Candle], minutes: u32) -> Vec<Candle> {
    let mut bars: Vec<Candle> = Vec::new();
    if minutes == 0 {
        return bars;
    }

    for candle in candles {
        let ts = candle.timestamp;
        let minute_of_day = ts.hour() * 60 + ts.minute();
        let bucket = ts
            - Duration::minutes(i64::from(minute_of_day % minutes))
            - Duration::seconds(i64::from(ts.second()))
            - Duration::nanoseconds(i64::from(ts.nanosecond()));

        match bars.last_mut() {
            Some(bar) if bar.timestamp == bucket => {
                bar.high = bar.high.max(candle.high);
                bar.low = bar.low.min(candle.low);
                bar.close = candle.close;
                bar.volume += candle.volume;
                bar.open_interest = candle.open_interest;
            }
            _ => bars.push(Candle {
                timestamp: bucket,
                ..candle.clone()
            }),
        }
    }
    bars
}

/// Adapter so candles can be fed to the `ta` indicators, which work in f64.
struct TaBar<'a>(&'a Candle);

impl ta::High for TaBar<'_> {
    fn high(&self) -> f64 {
        self.0.high.to_f64().unwrap_or(f64::NAN)
    }
}

impl ta::Low for TaBar<'_> {
    fn low(&self) -> f64 {
        self.0.low.to_f64().unwrap_or(f64::NAN)
    }
}

impl ta::Close for TaBar<'_> {
    fn close(&self) -> f64 {
        self.0.close.to_f64().unwrap_or(f64::NAN)
    }
}

/// Average true range over the whole series. Undefined until `period + 1` candles exist.
pub fn atr(candles: &[Candle], period: usize) -> Result<Option<Decimal>, SignalError> {
    let mut indicator = AverageTrueRange::new(period).map_err(|e| {
        SignalError::InvalidParameters(format!("Failed to initialize ATR: {:?}", e))
    })?;
    if candles.len() < period + 1 {
        return Ok(None);
    }

    let mut latest = f64::NAN;
    for candle in candles {
        latest = indicator.next(&TaBar(candle));
    }
    if !latest.is_finite() {
        return Err(SignalError::IndicatorError(
            "ATR produced a non-finite value".to_string(),
        ));
    }
    Ok(Decimal::from_f64(latest).map(|v| v.round_dp(4)))
}
