use crate::context::{SkipReason, StrategyContext, TemplateOutcome};
use crate::error::StrategyError;
use crate::orders;
use crate::TacticalTemplate;
use async_trait::async_trait;
use configuration::Config;
use core_types::TemplateKind;
use executor::{OrderGateway, PositionLedger};
use risk::StopLossCalculator;
use signals::{ProbabilityInputs, ProbabilityScorer};

/// Breakout template for the sideways-trap regimes.
///
/// Enters when the microstructure score is strong and the probability score qualifies.
/// It never exits on its own; open positions are left to the stop-loss monitor.
#[derive(Debug, Clone)]
pub struct HunterTemplate {
    score_threshold: i32,
    scorer: ProbabilityScorer,
    stops: StopLossCalculator,
}

impl HunterTemplate {
    pub fn new(config: &Config) -> Result<Self, StrategyError> {
        Ok(Self {
            score_threshold: config.microstructure.score_threshold,
            scorer: ProbabilityScorer::from(&config.probability),
            stops: StopLossCalculator::new(config.stop_loss.clone())?,
        })
    }
}

#[async_trait]
impl TacticalTemplate for HunterTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Hunter
    }

    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        ledger: &mut PositionLedger,
        gateway: &dyn OrderGateway,
    ) -> Result<TemplateOutcome, StrategyError> {
        if ledger.is_open(ctx.instrument) {
            return Ok(TemplateOutcome::Held);
        }
        let Some(direction) = ctx.score_direction() else {
            return Ok(TemplateOutcome::Skipped(SkipReason::BelowThreshold));
        };
        if ctx.score.abs() < self.score_threshold {
            return Ok(TemplateOutcome::Skipped(SkipReason::BelowThreshold));
        }
        if !ctx.volume_confirmed {
            return Ok(TemplateOutcome::Skipped(SkipReason::UnconfirmedVolume));
        }

        let inputs = ProbabilityInputs::evaluate(ctx.score, ctx.pcr, ctx.price, &ctx.hunter_zone);
        let probability = self.scorer.score(&inputs);
        if !self.scorer.passes(&inputs) {
            tracing::info!(
                instrument = ctx.instrument,
                probability,
                threshold = self.scorer.threshold(),
                "Probability score is below threshold. Skipping trade."
            );
            return Ok(TemplateOutcome::Skipped(SkipReason::BelowThreshold));
        }

        orders::enter(
            self.kind(),
            direction,
            Some(probability),
            &self.stops,
            ctx,
            ledger,
            gateway,
        )
        .await
    }
}
