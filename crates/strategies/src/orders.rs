use crate::atm::select_option;
use crate::context::{SkipReason, StrategyContext, TemplateOutcome};
use crate::error::StrategyError;
use configuration::TRADE_LOG_TARGET;
use core_types::{Direction, Position, TemplateKind};
use executor::{OrderGateway, PositionLedger};
use risk::{StopLossCalculator, cancel_protective_stop};
use uuid::Uuid;

/// Buys the ATM option for `direction`, protects it with a stop and records the position.
///
/// The stop is priced before any order is sent, and nothing reaches the ledger unless
/// the gateway accepts the entry. A failed stop placement after a filled entry is logged
/// and the position is still recorded, since the option is held either way.
pub(crate) async fn enter(
    kind: TemplateKind,
    direction: Direction,
    probability: Option<u32>,
    stops: &StopLossCalculator,
    ctx: &StrategyContext<'_>,
    ledger: &mut PositionLedger,
    gateway: &dyn OrderGateway,
) -> Result<TemplateOutcome, StrategyError> {
    if ledger.is_open(ctx.instrument) {
        return Ok(TemplateOutcome::Skipped(SkipReason::AlreadyPositioned));
    }

    let Some((strike, leg)) = select_option(ctx.option_chain, ctx.price, ctx.strike_step, direction)
    else {
        tracing::warn!(
            instrument = ctx.instrument,
            price = %ctx.price,
            %direction,
            "Could not find ATM option. Skipping trade."
        );
        return Ok(TemplateOutcome::Skipped(SkipReason::UnresolvedInstrument));
    };
    let option = leg.instrument_key.as_str();

    if gateway.is_positioned(option).await {
        tracing::info!(instrument = ctx.instrument, option, "Gateway already holds this option.");
        return Ok(TemplateOutcome::Skipped(SkipReason::AlreadyPositioned));
    }

    let stop_loss_price = stops.stop_for(kind, direction, ctx.price, ctx.indicators.atr, ctx.candles)?;

    tracing::info!(
        template = %kind,
        instrument = ctx.instrument,
        option,
        %strike,
        score = ctx.score,
        ?probability,
        vpa = ?ctx.vpa.label(),
        "Placing entry order"
    );
    let handle = gateway.place_entry(option, direction, ctx.quantity).await?;

    let stop_order_id = match gateway
        .place_protective_stop(option, stop_loss_price, ctx.quantity)
        .await
    {
        Ok(stop) => Some(stop.order_id),
        Err(e) => {
            tracing::warn!(
                instrument = ctx.instrument,
                option,
                stop = %stop_loss_price,
                error = %e,
                "Entry filled but protective stop was not placed"
            );
            None
        }
    };

    let position = Position {
        position_id: Uuid::new_v4(),
        underlying_instrument: ctx.instrument.to_string(),
        traded_instrument: option.to_string(),
        direction,
        template: kind,
        quantity: ctx.quantity,
        entry_price: ctx.price,
        entry_time: ctx.timestamp,
        stop_loss_price,
        entry_order_id: handle.order_id,
        stop_order_id,
    };
    let position = ledger.open(position)?.clone();

    tracing::info!(
        target: TRADE_LOG_TARGET,
        event = "ENTRY",
        template = %kind,
        instrument = ctx.instrument,
        option,
        %direction,
        price = %ctx.price,
        score = ctx.score,
        ?probability,
        vpa = ctx.vpa.label().unwrap_or("-"),
        stop = %stop_loss_price,
    );
    Ok(TemplateOutcome::Entered(position))
}

/// Cancels the protective stop, sells the held option at market and closes the ledger
/// record at the current price.
pub(crate) async fn exit(
    kind: TemplateKind,
    reason: &'static str,
    ctx: &StrategyContext<'_>,
    ledger: &mut PositionLedger,
    gateway: &dyn OrderGateway,
) -> Result<TemplateOutcome, StrategyError> {
    let Some(position) = ledger.get(ctx.instrument) else {
        return Ok(TemplateOutcome::Skipped(SkipReason::MissingReferenceData));
    };
    let option = position.traded_instrument.clone();
    let quantity = position.quantity;

    cancel_protective_stop(ctx.instrument, ledger, gateway).await;
    gateway.place_exit(&option, quantity).await?;
    let trade = ledger.close(ctx.instrument, ctx.price, ctx.timestamp)?.clone();

    tracing::info!(
        target: TRADE_LOG_TARGET,
        event = "EXIT",
        template = %kind,
        reason,
        instrument = ctx.instrument,
        option = %option,
        direction = %trade.direction,
        price = %ctx.price,
        score = ctx.score,
        pnl = %trade.pnl,
    );
    Ok(TemplateOutcome::Exited(trade))
}
