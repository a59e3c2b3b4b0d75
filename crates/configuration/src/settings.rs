use crate::error::ConfigError;
use chrono::{FixedOffset, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub instruments: Vec<InstrumentConfig>,
    pub session: Session,
    pub execution: Execution,
    pub day_classifier: DayClassifierParams,
    pub microstructure: MicrostructureParams,
    pub volume_analysis: VolumeAnalysisParams,
    pub probability: ProbabilityParams,
    pub stop_loss: StopLossParams,
    pub mean_reversion: MeanReversionParams,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instruments: InstrumentConfig::defaults(),
            session: Session::default(),
            execution: Execution::default(),
            day_classifier: DayClassifierParams::default(),
            microstructure: MicrostructureParams::default(),
            volume_analysis: VolumeAnalysisParams::default(),
            probability: ProbabilityParams::default(),
            stop_loss: StopLossParams::default(),
            mean_reversion: MeanReversionParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn instrument(&self, key: &str) -> Option<&InstrumentConfig> {
        self.instruments.iter().find(|i| i.key == key)
    }

    /// Rejects parameter combinations that cannot produce a meaningful decision cycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.microstructure.evwma_length == 0 {
            return fail("microstructure.evwma_length must be greater than 0");
        }
        if self.microstructure.long_timeframe_minutes < 2 {
            return fail("microstructure.long_timeframe_minutes must be at least 2");
        }
        if !(1..=12).contains(&self.microstructure.score_threshold) {
            return fail("microstructure.score_threshold must be between 1 and 12");
        }
        if self.volume_analysis.lookback == 0 {
            return fail("volume_analysis.lookback must be greater than 0");
        }
        if self.probability.threshold > 100 {
            return fail("probability.threshold must be between 0 and 100");
        }
        if self.stop_loss.atr_period == 0 || self.stop_loss.swing_lookback == 0 {
            return fail("stop_loss periods cannot be zero");
        }
        let multipliers = [
            self.stop_loss.multiplier_scalp,
            self.stop_loss.multiplier_hunter,
            self.stop_loss.multiplier_trend,
            self.stop_loss.fallback_buffer_pct,
        ];
        if multipliers.iter().any(|m| *m <= Decimal::ZERO) {
            return fail("stop_loss multipliers and fallback_buffer_pct must be positive");
        }
        if self.mean_reversion.stretch_pct <= Decimal::ZERO {
            return fail("mean_reversion.stretch_pct must be positive");
        }
        if self.session.utc_offset().is_none() {
            return fail("session.utc_offset_minutes is out of range");
        }
        if self.session.market_open >= self.session.market_close {
            return fail("session.market_open must be before session.market_close");
        }
        if self.execution.order_quantity == 0 {
            return fail("execution.order_quantity must be greater than 0");
        }
        for instrument in &self.instruments {
            if let Some(step) = instrument.strike_step {
                if step <= Decimal::ZERO {
                    return Err(ConfigError::ValidationError(format!(
                        "strike_step for {} must be positive",
                        instrument.key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A tracked underlying and how to reach its option chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstrumentConfig {
    /// The key candles arrive under (e.g. "NSE_INDEX|Nifty 50").
    pub key: String,
    /// The underlying the option chain is requested for.
    pub underlying: String,
    /// Strike granularity used to round the price to the ATM strike. When absent the
    /// nearest listed strike in the chain is used.
    #[serde(default)]
    pub strike_step: Option<Decimal>,
    /// An instrument whose volume stands in when this one reports none (index futures
    /// for a spot index).
    #[serde(default)]
    pub volume_proxy: Option<String>,
    /// A fixed expiry. When absent the provider's nearest expiry is used.
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
}

impl InstrumentConfig {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                key: "NSE_INDEX|Nifty 50".to_string(),
                underlying: "NSE_INDEX|Nifty 50".to_string(),
                strike_step: Some(dec!(50)),
                volume_proxy: None,
                expiry: None,
            },
            Self {
                key: "NSE_INDEX|Nifty Bank".to_string(),
                underlying: "NSE_INDEX|Nifty Bank".to_string(),
                strike_step: Some(dec!(100)),
                volume_proxy: None,
                expiry: None,
            },
        ]
    }
}

/// Exchange session timings, all in exchange-local time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Session {
    pub market_open: NaiveTime,
    pub market_close: NaiveTime,
    /// Candles at or after this time on the prior session form the hunter zone.
    pub hunter_zone_start: NaiveTime,
    /// How many calendar days back to search for the prior session.
    pub hunter_zone_lookback_days: u32,
    pub poll_interval_secs: u64,
    /// Exchange offset from UTC, in minutes (IST is +330).
    pub utc_offset_minutes: i32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            market_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            market_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
            hunter_zone_start: NaiveTime::from_hms_opt(14, 30, 0).unwrap_or_default(),
            hunter_zone_lookback_days: 10,
            poll_interval_secs: 60,
            utc_offset_minutes: 330,
        }
    }
}

impl Session {
    pub fn is_market_hours(&self, time: NaiveTime) -> bool {
        self.market_open <= time && time <= self.market_close
    }

    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Execution {
    /// Route orders to the simulated gateway instead of the broker.
    pub paper_trading: bool,
    /// Lots per order.
    pub order_quantity: u32,
}

impl Default for Execution {
    fn default() -> Self {
        Self {
            paper_trading: true,
            order_quantity: 1,
        }
    }
}

/// PCR thresholds for day-type classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DayClassifierParams {
    pub pcr_bullish: Decimal,
    pub pcr_bearish: Decimal,
    pub pcr_bull_trap: Decimal,
    pub pcr_bear_trap: Decimal,
}

impl Default for DayClassifierParams {
    fn default() -> Self {
        Self {
            pcr_bullish: dec!(1.2),
            pcr_bearish: dec!(0.7),
            pcr_bull_trap: dec!(0.9),
            pcr_bear_trap: dec!(1.1),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MicrostructureParams {
    /// |score| at or above this triggers an entry.
    pub score_threshold: i32,
    /// Bars in each EVWMA window.
    pub evwma_length: usize,
    /// Width of the bars the long-horizon EVWMA is computed on.
    pub long_timeframe_minutes: u32,
}

impl Default for MicrostructureParams {
    fn default() -> Self {
        Self {
            score_threshold: 7,
            evwma_length: 20,
            long_timeframe_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VolumeAnalysisParams {
    /// When disabled every score counts as confirmed.
    pub enabled: bool,
    pub lookback: usize,
    /// Latest volume must exceed this multiple of the mean prior volume.
    pub volume_surge_factor: Decimal,
    /// Latest range must stay under this multiple of the mean prior range.
    pub range_contraction_factor: Decimal,
}

impl Default for VolumeAnalysisParams {
    fn default() -> Self {
        Self {
            enabled: true,
            lookback: 10,
            volume_surge_factor: dec!(1.5),
            range_contraction_factor: dec!(0.7),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbabilityParams {
    pub threshold: u32,
}

impl Default for ProbabilityParams {
    fn default() -> Self {
        Self { threshold: 75 }
    }
}

/// ATR-based protective stop parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StopLossParams {
    pub atr_period: usize,
    /// Candles searched for the swing extreme.
    pub swing_lookback: usize,
    pub multiplier_scalp: Decimal,
    pub multiplier_hunter: Decimal,
    pub multiplier_trend: Decimal,
    /// Fraction of the entry price used as the buffer when ATR is undefined.
    pub fallback_buffer_pct: Decimal,
}

impl Default for StopLossParams {
    fn default() -> Self {
        Self {
            atr_period: 14,
            swing_lookback: 20,
            multiplier_scalp: dec!(0.7),
            multiplier_hunter: dec!(1.2),
            multiplier_trend: dec!(1.5),
            fallback_buffer_pct: dec!(0.01),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeanReversionParams {
    /// Minimum distance from the long EVWMA, as a fraction of it, before fading.
    pub stretch_pct: Decimal,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            stretch_pct: dec!(0.01),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Used when `RUST_LOG` is not set.
    pub level: LogLevel,
    /// Where the trade journal is written.
    pub trade_log_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            trade_log_path: "trades.log".to_string(),
        }
    }
}
