use configuration::VolumeAnalysisParams;
use core_types::Candle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Detects the four volume-price patterns used to confirm a microstructure score.
///
/// Every detector looks at the latest candle against the `lookback` candles before it.
#[derive(Debug, Clone)]
pub struct VolumePatternDetector {
    lookback: usize,
    surge_factor: Decimal,
    contraction_factor: Decimal,
}

impl Default for VolumePatternDetector {
    fn default() -> Self {
        Self {
            lookback: 10,
            surge_factor: dec!(1.5),
            contraction_factor: dec!(0.7),
        }
    }
}

impl From<&VolumeAnalysisParams> for VolumePatternDetector {
    fn from(params: &VolumeAnalysisParams) -> Self {
        Self {
            lookback: params.lookback,
            surge_factor: params.volume_surge_factor,
            contraction_factor: params.range_contraction_factor,
        }
    }
}

/// The outcome of all four detectors on one candle series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VpaSignals {
    pub pocket_pivot: bool,
    pub negative_pivot: bool,
    pub accumulation: bool,
    pub distribution: bool,
}

impl VpaSignals {
    /// A positive score needs a pocket pivot or accumulation, a negative one a negative
    /// pivot or distribution. A zero score has nothing to confirm.
    pub fn confirms(&self, score: i32) -> bool {
        match score.signum() {
            1 => self.pocket_pivot || self.accumulation,
            -1 => self.negative_pivot || self.distribution,
            _ => true,
        }
    }

    /// Short name of the first pattern present, for logging.
    pub fn label(&self) -> Option<&'static str> {
        if self.pocket_pivot {
            Some("PPV")
        } else if self.negative_pivot {
            Some("PNV")
        } else if self.accumulation {
            Some("Accumulation")
        } else if self.distribution {
            Some("Distribution")
        } else {
            None
        }
    }
}

impl VolumePatternDetector {
    pub fn new(lookback: usize, surge_factor: Decimal, contraction_factor: Decimal) -> Self {
        Self {
            lookback,
            surge_factor,
            contraction_factor,
        }
    }

    pub fn detect(&self, candles: &[Candle]) -> VpaSignals {
        VpaSignals {
            pocket_pivot: self.pocket_pivot(candles),
            negative_pivot: self.negative_pivot(candles),
            accumulation: self.accumulation(candles),
            distribution: self.distribution(candles),
        }
    }

    /// Up-close candle whose volume beats every down-close candle in the full lookback.
    pub fn pocket_pivot(&self, candles: &[Candle]) -> bool {
        let Some((latest, prior)) = self.full_window(candles) else {
            return false;
        };
        latest.is_up()
            && max_volume(prior.iter().filter(|c| c.is_down()))
                .is_some_and(|max| latest.volume > max)
    }

    /// Down-close candle whose volume beats every up-close candle in the full lookback.
    pub fn negative_pivot(&self, candles: &[Candle]) -> bool {
        let Some((latest, prior)) = self.full_window(candles) else {
            return false;
        };
        latest.is_down()
            && max_volume(prior.iter().filter(|c| c.is_up()))
                .is_some_and(|max| latest.volume > max)
    }

    /// Volume surge on a narrow up-close candle.
    pub fn accumulation(&self, candles: &[Candle]) -> bool {
        self.surge_on_narrow_range(candles)
            .is_some_and(|latest| latest.is_up())
    }

    /// Volume surge on a narrow down-close candle.
    pub fn distribution(&self, candles: &[Candle]) -> bool {
        self.surge_on_narrow_range(candles)
            .is_some_and(|latest| latest.is_down())
    }

    /// The latest candle and exactly `lookback` candles before it.
    fn full_window<'a>(&self, candles: &'a [Candle]) -> Option<(&'a Candle, &'a [Candle])> {
        if self.lookback == 0 || candles.len() < self.lookback + 1 {
            return None;
        }
        let (latest, rest) = candles.split_last()?;
        Some((latest, &rest[rest.len() - self.lookback..]))
    }

    fn surge_on_narrow_range<'a>(&self, candles: &'a [Candle]) -> Option<&'a Candle> {
        let (latest, rest) = candles.split_last()?;
        let prior = &rest[rest.len().saturating_sub(self.lookback)..];
        if prior.is_empty() {
            return None;
        }

        let count = Decimal::from(prior.len());
        let mean_volume = prior.iter().map(|c| c.volume).sum::<Decimal>() / count;
        let mean_range = prior.iter().map(Candle::range).sum::<Decimal>() / count;

        let surge = latest.volume > mean_volume * self.surge_factor;
        let narrow = latest.range() < mean_range * self.contraction_factor;
        (surge && narrow).then_some(latest)
    }
}

fn max_volume<'a>(candles: impl Iterator<Item = &'a Candle>) -> Option<Decimal> {
    candles.map(|c| c.volume).max()
}
