use crate::enums::{Direction, OrderSide, OrderType, TemplateKind};
use crate::error::CoreError;
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exchange timestamps keep their local offset so session times (09:15, 14:30, ...)
/// can be compared without a timezone database.
pub type Timestamp = DateTime<FixedOffset>;

/// Represents a single OHLCV candlestick for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Timestamp,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    #[serde(default)]
    pub open_interest: Decimal,
}

impl Candle {
    pub fn is_up(&self) -> bool {
        self.close > self.open
    }

    pub fn is_down(&self) -> bool {
        self.close < self.open
    }

    /// High minus low.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// Rejects candles whose prices are internally inconsistent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.high < self.low {
            return Err(CoreError::InvalidInput(
                "candle".to_string(),
                format!("high {} is below low {} at {}", self.high, self.low, self.timestamp),
            ));
        }
        if self.volume.is_sign_negative() {
            return Err(CoreError::InvalidInput(
                "candle".to_string(),
                format!("negative volume {} at {}", self.volume, self.timestamp),
            ));
        }
        Ok(())
    }
}

/// A raw trade print from the live feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub instrument: String,
    pub last_price: Decimal,
    pub last_qty: Decimal,
    pub timestamp: Timestamp,
}

/// The high/low of the final hour of the prior trading session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HunterZone {
    pub high: Decimal,
    pub low: Decimal,
}

impl HunterZone {
    /// True when `price` lies strictly inside the band.
    pub fn contains(&self, price: Decimal) -> bool {
        price > self.low && price < self.high
    }
}

/// One side (call or put) of a listed strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionLeg {
    pub instrument_key: String,
    #[serde(default)]
    pub open_interest: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeEntry {
    pub strike_price: Decimal,
    pub call: Option<OptionLeg>,
    pub put: Option<OptionLeg>,
}

impl StrikeEntry {
    /// The leg bought for a given direction: calls for `Bull`, puts for `Bear`.
    pub fn leg(&self, direction: Direction) -> Option<&OptionLeg> {
        match direction {
            Direction::Bull => self.call.as_ref(),
            Direction::Bear => self.put.as_ref(),
        }
    }
}

/// A read-only snapshot of an option chain for one underlying and expiry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    pub underlying: String,
    pub expiry: Option<NaiveDate>,
    pub strikes: Vec<StrikeEntry>,
}

impl OptionChainSnapshot {
    pub fn is_empty(&self) -> bool {
        self.strikes.is_empty()
    }

    pub fn strike(&self, strike_price: Decimal) -> Option<&StrikeEntry> {
        self.strikes.iter().find(|s| s.strike_price == strike_price)
    }
}

/// An open position held by the ledger. Prices refer to the underlying, which is
/// what the protective stop is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: Uuid,
    pub underlying_instrument: String,
    /// The option contract that was actually bought.
    pub traded_instrument: String,
    pub direction: Direction,
    pub template: TemplateKind,
    pub quantity: u32,
    pub entry_price: Decimal,
    pub entry_time: Timestamp,
    pub stop_loss_price: Decimal,
    pub entry_order_id: String,
    /// The resting protective-stop order, when the gateway accepted one.
    #[serde(default)]
    pub stop_order_id: Option<String>,
}

impl Position {
    /// Profit per unit if the position were closed at `price`.
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        match self.direction {
            Direction::Bull => price - self.entry_price,
            Direction::Bear => self.entry_price - price,
        }
    }

    /// Consumes the position and produces its immutable trade record.
    pub fn close(self, exit_price: Decimal, exit_time: Timestamp) -> Trade {
        let pnl = self.pnl_at(exit_price);
        Trade {
            trade_id: Uuid::new_v4(),
            position_id: self.position_id,
            underlying_instrument: self.underlying_instrument,
            traded_instrument: self.traded_instrument,
            direction: self.direction,
            template: self.template,
            quantity: self.quantity,
            entry_price: self.entry_price,
            exit_price,
            entry_time: self.entry_time,
            exit_time,
            pnl,
        }
    }
}

/// A completed round trip. Created once when a position closes and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: Uuid,
    pub position_id: Uuid,
    pub underlying_instrument: String,
    pub traded_instrument: String,
    pub direction: Direction,
    pub template: TemplateKind,
    pub quantity: u32,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub entry_time: Timestamp,
    pub exit_time: Timestamp,
    /// Per-unit profit: exit - entry for `Bull`, entry - exit for `Bear`.
    pub pnl: Decimal,
}

/// An instruction sent to the order gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub client_order_id: Uuid,
    pub instrument: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: u32,
    pub trigger_price: Option<Decimal>,
    pub tag: String,
}

impl OrderRequest {
    pub fn market(instrument: &str, side: OrderSide, quantity: u32, tag: &str) -> Self {
        Self {
            client_order_id: Uuid::new_v4(),
            instrument: instrument.to_string(),
            side,
            order_type: OrderType::Market,
            quantity,
            trigger_price: None,
            tag: tag.to_string(),
        }
    }

    /// A sell-side trigger order protecting a long option position.
    pub fn protective_stop(instrument: &str, trigger_price: Decimal, quantity: u32) -> Self {
        Self {
            client_order_id: Uuid::new_v4(),
            instrument: instrument.to_string(),
            side: OrderSide::Sell,
            order_type: OrderType::StopLoss,
            quantity,
            trigger_price: Some(trigger_price),
            tag: "protective_stop".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn position(direction: Direction) -> Position {
        Position {
            position_id: Uuid::new_v4(),
            underlying_instrument: "NSE_INDEX|Nifty 50".to_string(),
            traded_instrument: "NSE_FO|NIFTY-22000-CE".to_string(),
            direction,
            template: TemplateKind::P2PTrend,
            quantity: 1,
            entry_price: dec!(22000),
            entry_time: ts("2024-03-01T10:00:00+05:30"),
            stop_loss_price: dec!(21950),
            entry_order_id: "ord-1".to_string(),
            stop_order_id: None,
        }
    }

    #[test]
    fn bull_trade_pnl_is_exit_minus_entry() {
        let trade = position(Direction::Bull).close(dec!(22040), ts("2024-03-01T10:30:00+05:30"));
        assert_eq!(trade.pnl, dec!(40));
    }

    #[test]
    fn bear_trade_pnl_is_entry_minus_exit() {
        let trade = position(Direction::Bear).close(dec!(22040), ts("2024-03-01T10:30:00+05:30"));
        assert_eq!(trade.pnl, dec!(-40));
    }

    #[test]
    fn hunter_zone_bounds_are_exclusive() {
        let zone = HunterZone { high: dec!(100), low: dec!(90) };
        assert!(zone.contains(dec!(95)));
        assert!(!zone.contains(dec!(100)));
        assert!(!zone.contains(dec!(90)));
    }

    #[test]
    fn candle_deserializes_from_exchange_json() {
        let json = r#"{"timestamp":"2024-03-01T09:15:00+05:30","open":"100","high":"101",
            "low":"99","close":"100.5","volume":"1200"}"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert!(candle.is_up());
        assert_eq!(candle.open_interest, Decimal::ZERO);
        assert!(candle.validate().is_ok());
    }
}
