use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    /// A trigger order that becomes a market order once the trigger price trades.
    StopLoss,
}

/// The directional bias of a position. Both directions are expressed by *buying*
/// an option: `Bull` buys the call leg, `Bear` buys the put leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Bull,
    Bear,
}

impl Direction {
    /// The direction implied by the sign of a score. Zero carries no bias.
    pub fn from_score(score: i32) -> Option<Self> {
        match score.signum() {
            1 => Some(Direction::Bull),
            -1 => Some(Direction::Bear),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bull => write!(f, "BULL"),
            Direction::Bear => write!(f, "BEAR"),
        }
    }
}

/// The regime a trading day is classified into. Derived fresh every decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    BullishTrend,
    BearishTrend,
    SidewaysBullTrap,
    SidewaysBearTrap,
    SidewaysChoppy,
}

impl DayType {
    pub const ALL: [DayType; 5] = [
        DayType::BullishTrend,
        DayType::BearishTrend,
        DayType::SidewaysBullTrap,
        DayType::SidewaysBearTrap,
        DayType::SidewaysChoppy,
    ];
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DayType::BullishTrend => "Bullish Trend",
            DayType::BearishTrend => "Bearish Trend",
            DayType::SidewaysBullTrap => "Sideways Bull Trap",
            DayType::SidewaysBearTrap => "Sideways Bear Trap",
            DayType::SidewaysChoppy => "Sideways/Choppy",
        };
        f.write_str(label)
    }
}

/// Identifies a tactical template. Also selects the ATR multiplier used for its stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    Hunter,
    P2PTrend,
    MeanReversion,
    Scalp,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TemplateKind::Hunter => "Hunter",
            TemplateKind::P2PTrend => "P2P Trend",
            TemplateKind::MeanReversion => "Mean Reversion",
            TemplateKind::Scalp => "Scalp",
        };
        f.write_str(label)
    }
}
