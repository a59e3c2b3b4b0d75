use configuration::ProbabilityParams;
use core_types::HunterZone;
use rust_decimal::Decimal;

const PCR_ALIGNMENT_WEIGHT: u32 = 20;
const INDEX_SYNC_WEIGHT: u32 = 30;
const SCORE_FORCE_WEIGHT: u32 = 30;
const VALUE_AREA_WEIGHT: u32 = 20;

/// |score| must exceed this for the score-force confirmation.
const SCORE_FORCE_MIN: i32 = 10;

/// Whether the traded index moves in step with its peers.
///
/// No definition exists for this signal yet, so it always agrees.
pub fn index_sync_signal() -> bool {
    true
}

/// The four boolean confirmations the breakout template qualifies entries on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbabilityInputs {
    pub pcr_alignment: bool,
    pub index_sync: bool,
    pub score_force: bool,
    pub value_area: bool,
}

impl ProbabilityInputs {
    pub fn evaluate(score: i32, pcr: Option<Decimal>, price: Decimal, zone: &HunterZone) -> Self {
        let pcr_alignment = match pcr {
            Some(pcr) if score > 0 => pcr > Decimal::ONE,
            Some(pcr) if score < 0 => pcr < Decimal::ONE,
            _ => false,
        };
        Self {
            pcr_alignment,
            index_sync: index_sync_signal(),
            score_force: score.abs() > SCORE_FORCE_MIN,
            value_area: zone.contains(price),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbabilityScorer {
    threshold: u32,
}

impl Default for ProbabilityScorer {
    fn default() -> Self {
        Self { threshold: 75 }
    }
}

impl From<&ProbabilityParams> for ProbabilityScorer {
    fn from(params: &ProbabilityParams) -> Self {
        Self {
            threshold: params.threshold,
        }
    }
}

impl ProbabilityScorer {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// Weighted sum of the confirmations, in 0..=100.
    pub fn score(&self, inputs: &ProbabilityInputs) -> u32 {
        [
            (inputs.pcr_alignment, PCR_ALIGNMENT_WEIGHT),
            (inputs.index_sync, INDEX_SYNC_WEIGHT),
            (inputs.score_force, SCORE_FORCE_WEIGHT),
            (inputs.value_area, VALUE_AREA_WEIGHT),
        ]
        .iter()
        .filter(|(flag, _)| *flag)
        .map(|(_, weight)| weight)
        .sum()
    }

    pub fn passes(&self, inputs: &ProbabilityInputs) -> bool {
        self.score(inputs) >= self.threshold
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inputs(pcr_alignment: bool, index_sync: bool, score_force: bool, value_area: bool) -> ProbabilityInputs {
        ProbabilityInputs {
            pcr_alignment,
            index_sync,
            score_force,
            value_area,
        }
    }

    #[test]
    fn weights_sum_for_enabled_flags() {
        let scorer = ProbabilityScorer::default();
        assert_eq!(scorer.score(&inputs(true, true, true, true)), 100);
        assert_eq!(scorer.score(&inputs(false, false, false, false)), 0);
        assert_eq!(scorer.score(&inputs(true, false, true, false)), 50);
    }

    #[test]
    fn threshold_is_inclusive() {
        let scorer = ProbabilityScorer::new(80);
        assert!(scorer.passes(&inputs(false, true, true, true)));
        assert!(!scorer.passes(&inputs(true, true, false, true)));
    }

    #[test]
    fn evaluate_reads_each_confirmation() {
        let zone = HunterZone {
            high: dec!(22100),
            low: dec!(21900),
        };
        let bullish = ProbabilityInputs::evaluate(11, Some(dec!(1.3)), dec!(22000), &zone);
        assert_eq!(bullish, inputs(true, true, true, true));

        let misaligned = ProbabilityInputs::evaluate(-8, Some(dec!(1.3)), dec!(22200), &zone);
        assert_eq!(misaligned, inputs(false, true, false, false));
    }

    #[test]
    fn undefined_pcr_never_aligns() {
        let zone = HunterZone {
            high: dec!(1),
            low: dec!(0),
        };
        assert!(!ProbabilityInputs::evaluate(12, None, dec!(5), &zone).pcr_alignment);
    }
}
