use configuration::DayClassifierParams;
use core_types::{DayType, HunterZone};
use rust_decimal::Decimal;

/// Maps the session open, the prior session's hunter zone and the PCR to a regime.
#[derive(Debug, Clone, Default)]
pub struct DayClassifier {
    params: DayClassifierParams,
}

impl DayClassifier {
    pub fn new(params: DayClassifierParams) -> Self {
        Self { params }
    }

    /// Rules are evaluated in order and the first match wins.
    pub fn classify(
        &self,
        opening_price: Decimal,
        zone_high: Decimal,
        zone_low: Decimal,
        pcr: Decimal,
    ) -> DayType {
        let p = &self.params;
        let above = opening_price > zone_high;
        let below = opening_price < zone_low;

        if above && pcr > p.pcr_bullish {
            DayType::BullishTrend
        } else if below && pcr < p.pcr_bearish {
            DayType::BearishTrend
        } else if above && pcr < p.pcr_bull_trap {
            DayType::SidewaysBullTrap
        } else if below && pcr > p.pcr_bear_trap {
            DayType::SidewaysBearTrap
        } else {
            DayType::SidewaysChoppy
        }
    }

    pub fn classify_zone(&self, opening_price: Decimal, zone: &HunterZone, pcr: Decimal) -> DayType {
        self.classify(opening_price, zone.high, zone.low, pcr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn classify(open: Decimal, high: Decimal, low: Decimal, pcr: Decimal) -> DayType {
        DayClassifier::default().classify(open, high, low, pcr)
    }

    #[test]
    fn each_rule_is_reachable() {
        assert_eq!(classify(dec!(105), dec!(100), dec!(90), dec!(1.3)), DayType::BullishTrend);
        assert_eq!(classify(dec!(85), dec!(100), dec!(90), dec!(0.6)), DayType::BearishTrend);
        assert_eq!(classify(dec!(105), dec!(100), dec!(90), dec!(0.8)), DayType::SidewaysBullTrap);
        assert_eq!(classify(dec!(85), dec!(100), dec!(90), dec!(1.2)), DayType::SidewaysBearTrap);
        assert_eq!(classify(dec!(95), dec!(100), dec!(90), dec!(1.0)), DayType::SidewaysChoppy);
    }

    #[test]
    fn thresholds_are_strict() {
        // Above the zone with PCR exactly at the bullish threshold is neither a trend
        // nor a bull trap.
        assert_eq!(classify(dec!(105), dec!(100), dec!(90), dec!(1.2)), DayType::SidewaysChoppy);
        // Opening exactly on the zone high is not a breakout.
        assert_eq!(classify(dec!(100), dec!(100), dec!(90), dec!(1.5)), DayType::SidewaysChoppy);
    }

    #[test]
    fn is_a_pure_function() {
        let classifier = DayClassifier::default();
        let zone = HunterZone { high: dec!(100), low: dec!(90) };
        let first = classifier.classify_zone(dec!(85), &zone, dec!(0.5));
        let second = classifier.classify_zone(dec!(85), &zone, dec!(0.5));
        assert_eq!(first, second);
        assert_eq!(first, DayType::BearishTrend);
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let classifier = DayClassifier::new(DayClassifierParams {
            pcr_bullish: dec!(1.5),
            ..DayClassifierParams::default()
        });
        assert_eq!(
            classifier.classify(dec!(105), dec!(100), dec!(90), dec!(1.3)),
            DayType::SidewaysChoppy
        );
    }
}
