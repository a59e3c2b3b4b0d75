use crate::error::StrategyError;
use crate::hunter::HunterTemplate;
use crate::mean_reversion::MeanReversionTemplate;
use crate::p2p_trend::P2PTrendTemplate;
use crate::scalp::ScalpTemplate;
use crate::TacticalTemplate;
use configuration::Config;
use core_types::{DayType, TemplateKind};

/// The template that trades a given day type.
pub fn template_for(day_type: DayType) -> TemplateKind {
    match day_type {
        DayType::BullishTrend | DayType::BearishTrend => TemplateKind::P2PTrend,
        DayType::SidewaysBullTrap | DayType::SidewaysBearTrap => TemplateKind::Hunter,
        DayType::SidewaysChoppy => TemplateKind::MeanReversion,
    }
}

/// Creates a new template instance from the configuration.
pub fn create_template(
    kind: TemplateKind,
    config: &Config,
) -> Result<Box<dyn TacticalTemplate>, StrategyError> {
    // The compiler will error if a new TemplateKind is added but not handled here.
    match kind {
        TemplateKind::Hunter => Ok(Box::new(HunterTemplate::new(config)?)),
        TemplateKind::P2PTrend => Ok(Box::new(P2PTrendTemplate::new(config)?)),
        TemplateKind::MeanReversion => Ok(Box::new(MeanReversionTemplate::new(config)?)),
        TemplateKind::Scalp => Ok(Box::new(ScalpTemplate)),
    }
}

/// One instance of every template, looked up by day type each cycle.
pub struct TemplateBook {
    hunter: Box<dyn TacticalTemplate>,
    p2p_trend: Box<dyn TacticalTemplate>,
    mean_reversion: Box<dyn TacticalTemplate>,
    scalp: Box<dyn TacticalTemplate>,
}

impl TemplateBook {
    pub fn new(config: &Config) -> Result<Self, StrategyError> {
        Ok(Self {
            hunter: create_template(TemplateKind::Hunter, config)?,
            p2p_trend: create_template(TemplateKind::P2PTrend, config)?,
            mean_reversion: create_template(TemplateKind::MeanReversion, config)?,
            scalp: create_template(TemplateKind::Scalp, config)?,
        })
    }

    pub fn get(&self, kind: TemplateKind) -> &dyn TacticalTemplate {
        match kind {
            TemplateKind::Hunter => self.hunter.as_ref(),
            TemplateKind::P2PTrend => self.p2p_trend.as_ref(),
            TemplateKind::MeanReversion => self.mean_reversion.as_ref(),
            TemplateKind::Scalp => self.scalp.as_ref(),
        }
    }

    pub fn for_day(&self, day_type: DayType) -> &dyn TacticalTemplate {
        self.get(template_for(day_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_day_type_maps_to_a_template() {
        let book = TemplateBook::new(&Config::default()).unwrap();
        for day_type in DayType::ALL {
            assert_eq!(book.for_day(day_type).kind(), template_for(day_type));
        }
    }

    #[test]
    fn regimes_map_to_their_templates() {
        assert_eq!(template_for(DayType::BullishTrend), TemplateKind::P2PTrend);
        assert_eq!(template_for(DayType::BearishTrend), TemplateKind::P2PTrend);
        assert_eq!(template_for(DayType::SidewaysBullTrap), TemplateKind::Hunter);
        assert_eq!(template_for(DayType::SidewaysBearTrap), TemplateKind::Hunter);
        assert_eq!(template_for(DayType::SidewaysChoppy), TemplateKind::MeanReversion);
    }

    #[test]
    fn scalp_is_buildable_but_never_selected() {
        let scalp = create_template(TemplateKind::Scalp, &Config::default()).unwrap();
        assert_eq!(scalp.kind(), TemplateKind::Scalp);
        assert!(DayType::ALL.iter().all(|d| template_for(*d) != TemplateKind::Scalp));
    }
}
