use crate::error::RiskError;
use configuration::TRADE_LOG_TARGET;
use core_types::{Direction, Position, Timestamp, Trade};
use executor::{OrderGateway, PositionLedger};
use rust_decimal::Decimal;

/// Cancels the resting protective stop of `instrument`'s position, if one was placed.
///
/// Runs before every exit so no broker-side stop outlives the option it protects. A
/// failed cancel is logged and the exit still goes ahead.
pub async fn cancel_protective_stop(
    instrument: &str,
    ledger: &mut PositionLedger,
    gateway: &dyn OrderGateway,
) {
    let Some(handle) = ledger.take_stop_order(instrument) else {
        return;
    };
    if let Err(e) = gateway.cancel(&handle).await {
        tracing::warn!(
            instrument,
            option = %handle.instrument,
            order_id = %handle.order_id,
            error = %e,
            "Failed to cancel protective stop"
        );
    }
}

/// Checks open positions against their protective stops on every new price.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopLossMonitor;

impl StopLossMonitor {
    pub fn new() -> Self {
        Self
    }

    /// `Bull` positions stop out at or below the stop, `Bear` at or above it.
    pub fn is_triggered(position: &Position, price: Decimal) -> bool {
        match position.direction {
            Direction::Bull => price <= position.stop_loss_price,
            Direction::Bear => price >= position.stop_loss_price,
        }
    }

    /// Exits the instrument's position if `price` has crossed its stop.
    ///
    /// Returns the closed trade, or `None` when the instrument is flat or the stop holds.
    /// A rejected exit order leaves the ledger untouched.
    pub async fn enforce(
        &self,
        instrument: &str,
        price: Decimal,
        time: Timestamp,
        ledger: &mut PositionLedger,
        gateway: &dyn OrderGateway,
    ) -> Result<Option<Trade>, RiskError> {
        let Some(position) = ledger.get(instrument) else {
            return Ok(None);
        };
        if !Self::is_triggered(position, price) {
            return Ok(None);
        }

        let stop = position.stop_loss_price;
        let traded = position.traded_instrument.clone();
        let quantity = position.quantity;

        cancel_protective_stop(instrument, ledger, gateway).await;
        gateway.place_exit(&traded, quantity).await?;
        let trade = ledger.close(instrument, price, time)?.clone();

        tracing::info!(
            target: TRADE_LOG_TARGET,
            event = "EXIT",
            reason = "stop_loss",
            template = %trade.template,
            instrument,
            option = %trade.traded_instrument,
            direction = %trade.direction,
            %stop,
            exit_price = %price,
            pnl = %trade.pnl,
        );
        Ok(Some(trade))
    }
}
