use crate::context::{SkipReason, StrategyContext, TemplateOutcome};
use crate::error::StrategyError;
use crate::orders;
use crate::TacticalTemplate;
use async_trait::async_trait;
use configuration::Config;
use core_types::TemplateKind;
use executor::{OrderGateway, PositionLedger};
use risk::StopLossCalculator;

/// Point-to-point trend template for the directional regimes.
///
/// Enters on a strong score and holds until the score's sign turns against the position.
#[derive(Debug, Clone)]
pub struct P2PTrendTemplate {
    score_threshold: i32,
    stops: StopLossCalculator,
}

impl P2PTrendTemplate {
    pub fn new(config: &Config) -> Result<Self, StrategyError> {
        Ok(Self {
            score_threshold: config.microstructure.score_threshold,
            stops: StopLossCalculator::new(config.stop_loss.clone())?,
        })
    }
}

#[async_trait]
impl TacticalTemplate for P2PTrendTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::P2PTrend
    }

    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        ledger: &mut PositionLedger,
        gateway: &dyn OrderGateway,
    ) -> Result<TemplateOutcome, StrategyError> {
        if let Some(position) = ledger.get(ctx.instrument) {
            let flipped = ctx
                .score_direction()
                .is_some_and(|d| d != position.direction);
            if !flipped {
                return Ok(TemplateOutcome::Held);
            }
            tracing::info!(instrument = ctx.instrument, score = ctx.score, "Score flipped. Closing position.");
            return orders::exit(self.kind(), "score_flip", ctx, ledger, gateway).await;
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

        orders::enter(self.kind(), direction, None, &self.stops, ctx, ledger, gateway).await
    }
}
