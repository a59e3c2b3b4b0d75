use crate::context::{SkipReason, StrategyContext, TemplateOutcome};
use crate::error::StrategyError;
use crate::TacticalTemplate;
use async_trait::async_trait;
use core_types::TemplateKind;
use executor::{OrderGateway, PositionLedger};

/// Placeholder. Never trades.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalpTemplate;

#[async_trait]
impl TacticalTemplate for ScalpTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::Scalp
    }

    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        _ledger: &mut PositionLedger,
        _gateway: &dyn OrderGateway,
    ) -> Result<TemplateOutcome, StrategyError> {
        tracing::debug!(instrument = ctx.instrument, "Scalp template is not implemented.");
        Ok(TemplateOutcome::Skipped(SkipReason::NotImplemented))
    }
}
