use core_types::{Candle, DayType, Direction, HunterZone, OptionChainSnapshot, Position, Timestamp, Trade};
use rust_decimal::Decimal;
use signals::{IndicatorValues, VpaSignals};
use std::fmt;

/// Everything a template may read during one decision cycle for one instrument.
#[derive(Debug, Clone)]
pub struct StrategyContext<'a> {
    /// The underlying the position is keyed by.
    pub instrument: &'a str,
    pub timestamp: Timestamp,
    /// Close of the latest candle.
    pub price: Decimal,
    pub score: i32,
    pub pcr: Option<Decimal>,
    pub day_type: DayType,
    pub hunter_zone: HunterZone,
    pub option_chain: &'a OptionChainSnapshot,
    pub indicators: IndicatorValues,
    pub vpa: VpaSignals,
    /// False when volume analysis is enabled and the VPA signals disagree with the score.
    pub volume_confirmed: bool,
    pub candles: &'a [Candle],
    pub strike_step: Option<Decimal>,
    pub quantity: u32,
}

impl StrategyContext<'_> {
    pub fn score_direction(&self) -> Option<Direction> {
        Direction::from_score(self.score)
    }
}

/// Why a template took no action this cycle. None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingReferenceData,
    IndeterminateIndicator,
    UnresolvedInstrument,
    UnconfirmedVolume,
    BelowThreshold,
    AlreadyPositioned,
    /// The latest candle was already run through a decision cycle.
    DuplicateCandle,
    NotImplemented,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::MissingReferenceData => "missing reference data",
            SkipReason::IndeterminateIndicator => "indicator undefined",
            SkipReason::UnresolvedInstrument => "no matching option contract",
            SkipReason::UnconfirmedVolume => "volume does not confirm score",
            SkipReason::BelowThreshold => "below threshold",
            SkipReason::AlreadyPositioned => "already positioned",
            SkipReason::DuplicateCandle => "candle already processed",
            SkipReason::NotImplemented => "template not implemented",
        };
        f.write_str(label)
    }
}

/// What a template did this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateOutcome {
    Entered(Position),
    Exited(Trade),
    /// A position is open and the template chose to keep it.
    Held,
    Skipped(SkipReason),
}
