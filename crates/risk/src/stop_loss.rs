use crate::error::RiskError;
use configuration::StopLossParams;
use core_types::{Candle, Direction, TemplateKind};
use rust_decimal::Decimal;

/// Lowest low (`Bull`) or highest high (`Bear`) of the last `lookback` candles.
pub fn find_recent_swing(candles: &[Candle], direction: Direction, lookback: usize) -> Option<Decimal> {
    let window = &candles[candles.len().saturating_sub(lookback)..];
    match direction {
        Direction::Bull => window.iter().map(|c| c.low).min(),
        Direction::Bear => window.iter().map(|c| c.high).max(),
    }
}

/// Stop price one buffer beyond the swing reference.
///
/// The reference is the swing extreme, or the entry itself when the swing lies on the
/// wrong side of it, so a `Bull` stop is always below entry and a `Bear` stop above.
/// The buffer is `multiplier * atr`, or `entry * fallback_pct` when ATR is undefined.
pub fn calculate_stop_loss(
    atr: Option<Decimal>,
    multiplier: Decimal,
    swing: Option<Decimal>,
    direction: Direction,
    entry_price: Decimal,
    fallback_pct: Decimal,
) -> Result<Decimal, RiskError> {
    if entry_price <= Decimal::ZERO {
        return Err(RiskError::InvalidEntryPrice(entry_price));
    }

    let buffer = match atr {
        Some(atr) if atr > Decimal::ZERO => multiplier * atr,
        _ => entry_price * fallback_pct,
    };
    if buffer <= Decimal::ZERO {
        return Err(RiskError::InvalidStopLoss(format!(
            "volatility buffer {} is not positive",
            buffer
        )));
    }

    let swing = swing.unwrap_or(entry_price);
    Ok(match direction {
        Direction::Bull => swing.min(entry_price) - buffer,
        Direction::Bear => swing.max(entry_price) + buffer,
    })
}

/// Stop pricing bound to the configured multipliers.
#[derive(Debug, Clone)]
pub struct StopLossCalculator {
    params: StopLossParams,
}

impl StopLossCalculator {
    pub fn new(params: StopLossParams) -> Result<Self, RiskError> {
        if params.fallback_buffer_pct <= Decimal::ZERO {
            return Err(RiskError::InvalidParameters(
                "fallback_buffer_pct must be greater than 0".to_string(),
            ));
        }
        Ok(Self { params })
    }

    /// Mean-reversion trades use the scalp multiplier.
    pub fn multiplier(&self, template: TemplateKind) -> Decimal {
        match template {
            TemplateKind::Hunter => self.params.multiplier_hunter,
            TemplateKind::P2PTrend => self.params.multiplier_trend,
            TemplateKind::MeanReversion | TemplateKind::Scalp => self.params.multiplier_scalp,
        }
    }

    pub fn stop_for(
        &self,
        template: TemplateKind,
        direction: Direction,
        entry_price: Decimal,
        atr: Option<Decimal>,
        candles: &[Candle],
    ) -> Result<Decimal, RiskError> {
        let swing = find_recent_swing(candles, direction, self.params.swing_lookback);
        calculate_stop_loss(
            atr,
            self.multiplier(template),
            swing,
            direction,
            entry_price,
            self.params.fallback_buffer_pct,
        )
    }
}
