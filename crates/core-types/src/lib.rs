pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{DayType, Direction, OrderSide, OrderType, TemplateKind};
pub use error::CoreError;
pub use structs::{
    Candle, HunterZone, OptionChainSnapshot, OptionLeg, OrderRequest, Position, StrikeEntry, Tick,
    Timestamp, Trade,
};
