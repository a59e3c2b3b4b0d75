//! # Confluence Tactical Templates
//!
//! This crate contains the trading logic run once per instrument per decision cycle. It
//! defines the `TacticalTemplate` trait and its four implementations, one of which is
//! selected for each cycle from the day's `DayType`.
//!
//! ## Architectural Principles
//!
//! - **Explicit context:** every input a template may read arrives in a typed
//!   `StrategyContext`; templates hold only their configured parameters, never
//!   per-instrument state.
//! - **Side effects through collaborators:** a template changes the world only through
//!   the `OrderGateway` and the `PositionLedger` it is handed. The ledger is touched only
//!   after the gateway accepts the order.
//! - **Expected absence is an outcome:** missing data, unconfirmed volume or a weak score
//!   produce `TemplateOutcome::Skipped`, while rejected orders surface as errors.
//!
//! ## Public API
//!
//! - `TacticalTemplate`: the trait all templates implement.
//! - `template_for` / `create_template` / `TemplateBook`: the DayType lookup table.
//! - `StrategyContext`, `TemplateOutcome`, `SkipReason`.

pub mod atm;
pub mod context;
pub mod error;
pub mod factory;
pub mod hunter;
pub mod mean_reversion;
pub mod p2p_trend;
pub mod scalp;

mod orders;

#[cfg(test)]
mod test_support;

pub use atm::{find_atm_strike, select_option};
pub use context::{SkipReason, StrategyContext, TemplateOutcome};
pub use error::StrategyError;
pub use factory::{TemplateBook, create_template, template_for};
pub use hunter::HunterTemplate;
pub use mean_reversion::MeanReversionTemplate;
pub use p2p_trend::P2PTrendTemplate;
pub use scalp::ScalpTemplate;

use async_trait::async_trait;
use core_types::TemplateKind;
use executor::{OrderGateway, PositionLedger};

/// The contract every tactical template implements.
///
/// `execute` runs one decision cycle for the instrument named in the context: it may
/// enter, exit or do nothing. Templates are stateless between calls, so one instance can
/// serve every instrument.
#[async_trait]
pub trait TacticalTemplate: Send + Sync {
    fn kind(&self) -> TemplateKind;

    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        ledger: &mut PositionLedger,
        gateway: &dyn OrderGateway,
    ) -> Result<TemplateOutcome, StrategyError>;
}
