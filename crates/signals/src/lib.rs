//! # Confluence Signals
//!
//! The pure, stateless calculators that turn a candle series and an option-chain snapshot
//! into the inputs of a decision cycle:
//!
//! - `DayClassifier`: opening price vs. hunter zone plus PCR, mapped to a `DayType`.
//! - `calculate_pcr`: aggregate put/call open-interest ratio.
//! - `IndicatorValues`: the two EVWMA horizons with their slopes and the ATR.
//! - `microstructure_score`: the bounded confluence score in [-12, 12].
//! - `VolumePatternDetector`: pocket pivot, negative pivot, accumulation, distribution.
//! - `ProbabilityScorer`: the weighted qualification score used by the hunter template.
//!
//! Like the `strategies` crate this is Layer 1 logic. Nothing here performs I/O or holds
//! state between calls.

pub mod day_type;
pub mod error;
pub mod indicators;
pub mod microstructure;
pub mod pcr;
pub mod probability;
pub mod volume;

pub use day_type::DayClassifier;
pub use error::SignalError;
pub use indicators::{EvwmaReading, IndicatorValues, atr, evwma, resample};
pub use microstructure::{MAX_SCORE, microstructure_score};
pub use pcr::calculate_pcr;
pub use probability::{ProbabilityInputs, ProbabilityScorer, index_sync_signal};
pub use volume::{VolumePatternDetector, VpaSignals};
