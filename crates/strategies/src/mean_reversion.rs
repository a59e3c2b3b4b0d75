use crate::context::{SkipReason, StrategyContext, TemplateOutcome};
use crate::error::StrategyError;
use crate::orders;
use crate::TacticalTemplate;
use async_trait::async_trait;
use configuration::Config;
use core_types::{Direction, TemplateKind};
use executor::{OrderGateway, PositionLedger};
use risk::StopLossCalculator;
use rust_decimal::Decimal;

/// Fades stretches away from the long EVWMA on choppy days.
///
/// Enters against a move once price is `stretch_pct` or more from the long-horizon
/// EVWMA, and exits when price crosses back over the short-horizon EVWMA.
#[derive(Debug, Clone)]
pub struct MeanReversionTemplate {
    stretch_pct: Decimal,
    stops: StopLossCalculator,
}

impl MeanReversionTemplate {
    pub fn new(config: &Config) -> Result<Self, StrategyError> {
        if config.mean_reversion.stretch_pct <= Decimal::ZERO {
            return Err(StrategyError::InvalidParameters(
                "stretch_pct must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            stretch_pct: config.mean_reversion.stretch_pct,
            stops: StopLossCalculator::new(config.stop_loss.clone())?,
        })
    }

    /// The fade direction, if price has stretched far enough from `mean`.
    fn fade_direction(&self, price: Decimal, mean: Decimal) -> Option<Direction> {
        if price >= mean * (Decimal::ONE + self.stretch_pct) {
            Some(Direction::Bear)
        } else if price <= mean * (Decimal::ONE - self.stretch_pct) {
            Some(Direction::Bull)
        } else {
            None
        }
    }
}

#[async_trait]
impl TacticalTemplate for MeanReversionTemplate {
    fn kind(&self) -> TemplateKind {
        TemplateKind::MeanReversion
    }

    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        ledger: &mut PositionLedger,
        gateway: &dyn OrderGateway,
    ) -> Result<TemplateOutcome, StrategyError> {
        let (Some(short), Some(long)) = (ctx.indicators.evwma_short, ctx.indicators.evwma_long)
        else {
            tracing::warn!(instrument = ctx.instrument, "EVWMA values are not available. Skipping.");
            return Ok(TemplateOutcome::Skipped(SkipReason::IndeterminateIndicator));
        };

        if let Some(position) = ledger.get(ctx.instrument) {
            let reverted = match position.direction {
                Direction::Bull => ctx.price >= short.value,
                Direction::Bear => ctx.price <= short.value,
            };
            if !reverted {
                return Ok(TemplateOutcome::Held);
            }
            tracing::info!(instrument = ctx.instrument, price = %ctx.price, "Price reverted. Closing position.");
            return orders::exit(self.kind(), "mean_reverted", ctx, ledger, gateway).await;
        }

        let Some(direction) = self.fade_direction(ctx.price, long.value) else {
            return Ok(TemplateOutcome::Skipped(SkipReason::BelowThreshold));
        };
        if !ctx.volume_confirmed {
            return Ok(TemplateOutcome::Skipped(SkipReason::UnconfirmedVolume));
        }
        tracing::debug!(instrument = ctx.instrument, price = %ctx.price, evwma_long = %long.value, "Price stretched from mean");

        orders::enter(self.kind(), direction, None, &self.stops, ctx, ledger, gateway).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, NIFTY};
    use executor::SimulatedGateway;
    use rust_decimal_macros::dec;

    fn template() -> MeanReversionTemplate {
        MeanReversionTemplate::new(&Config::default()).unwrap()
    }

    #[tokio::test]
    async fn fades_a_stretch_and_exits_on_reversion() {
        let fixture = Fixture::new();
        let gateway = SimulatedGateway::new();
        let mut ledger = PositionLedger::new();
        let reversion = template();

        // 1% above the long EVWMA of 22000 is 22220.
        let entered = reversion
            .execute(&fixture.ctx(dec!(22250), 4), &mut ledger, &gateway)
            .await
            .unwrap();
        let TemplateOutcome::Entered(position) = entered else {
            panic!("expected an entry, got {entered:?}");
        };
        assert_eq!(position.direction, Direction::Bear);
        assert_eq!(position.traded_instrument, "PE-22250");
        assert!(position.stop_loss_price > position.entry_price);

        let held = reversion
            .execute(&fixture.ctx(dec!(22100), 4), &mut ledger, &gateway)
            .await
            .unwrap();
        assert_eq!(held, TemplateOutcome::Held);

        let exited = reversion
            .execute(&fixture.ctx(dec!(21995), 4), &mut ledger, &gateway)
            .await
            .unwrap();
        assert!(matches!(exited, TemplateOutcome::Exited(ref t) if t.pnl == dec!(255)));
        assert!(!ledger.is_open(NIFTY));
    }

    #[tokio::test]
    async fn small_deviation_does_nothing() {
        let fixture = Fixture::new();
        let outcome = template()
            .execute(&fixture.ctx(dec!(22100), 4), &mut PositionLedger::new(), &SimulatedGateway::new())
            .await
            .unwrap();
        assert_eq!(outcome, TemplateOutcome::Skipped(SkipReason::BelowThreshold));
    }

    #[tokio::test]
    async fn undefined_evwma_skips() {
        let fixture = Fixture::new();
        let mut ctx = fixture.ctx(dec!(21500), -4);
        ctx.indicators.evwma_long = None;
        let outcome = template()
            .execute(&ctx, &mut PositionLedger::new(), &SimulatedGateway::new())
            .await
            .unwrap();
        assert_eq!(outcome, TemplateOutcome::Skipped(SkipReason::IndeterminateIndicator));
    }
}
