use crate::error::ExecutorError;
use crate::gateway::OrderHandle;
use core_types::{Position, Timestamp, Trade};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Open positions keyed by underlying instrument, and the trades closed so far.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    open: HashMap<String, Position>,
    trades: Vec<Trade>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new position. Fails if the instrument already has one.
    pub fn open(&mut self, position: Position) -> Result<&Position, ExecutorError> {
        let key = position.underlying_instrument.clone();
        if self.open.contains_key(&key) {
            return Err(ExecutorError::PositionAlreadyOpen(key));
        }
        Ok(self.open.entry(key).or_insert(position))
    }

    pub fn get(&self, instrument: &str) -> Option<&Position> {
        self.open.get(instrument)
    }

    pub fn is_open(&self, instrument: &str) -> bool {
        self.open.contains_key(instrument)
    }

    /// Detaches the resting protective stop from the instrument's position.
    pub fn take_stop_order(&mut self, instrument: &str) -> Option<OrderHandle> {
        let position = self.open.get_mut(instrument)?;
        let order_id = position.stop_order_id.take()?;
        Some(OrderHandle {
            order_id,
            instrument: position.traded_instrument.clone(),
        })
    }

    /// Removes the open position and appends its trade record.
    pub fn close(
        &mut self,
        instrument: &str,
        exit_price: Decimal,
        exit_time: Timestamp,
    ) -> Result<&Trade, ExecutorError> {
        let position = self
            .open
            .remove(instrument)
            .ok_or_else(|| ExecutorError::PositionNotFound(instrument.to_string()))?;
        self.trades.push(position.close(exit_price, exit_time));
        self.trades
            .last()
            .ok_or_else(|| ExecutorError::PositionNotFound(instrument.to_string()))
    }

    /// Open positions ordered by instrument.
    pub fn list_open(&self) -> Vec<&Position> {
        let mut positions: Vec<_> = self.open.values().collect();
        positions.sort_by(|a, b| a.underlying_instrument.cmp(&b.underlying_instrument));
        positions
    }

    pub fn list_trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_parts(self) -> (Vec<Position>, Vec<Trade>) {
        let mut open: Vec<_> = self.open.into_values().collect();
        open.sort_by(|a, b| a.underlying_instrument.cmp(&b.underlying_instrument));
        (open, self.trades)
    }
}
