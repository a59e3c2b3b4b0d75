use executor::{PaperPosition, PositionLedger};
use std::collections::{HashMap, HashSet};

/// A disagreement between the ledger and the gateway's view of held options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// The ledger records a position the gateway does not hold.
    Ghost { instrument: String, option: String },
    /// The gateway holds an option the ledger has no record of.
    Untracked { option: String },
    QuantityMismatch {
        option: String,
        ledger: u32,
        gateway: u32,
    },
}

/// The "Source of Truth Auditor".
///
/// Compares the in-memory ledger against the positions the order gateway reports.
/// It never repairs state; every mismatch is logged and returned to the caller.
pub struct StateReconciler;

impl StateReconciler {
    pub fn run_reconciliation(
        ledger: &PositionLedger,
        gateway_positions: &[PaperPosition],
    ) -> Vec<Discrepancy> {
        tracing::info!("Running state reconciliation check...");

        let held: HashMap<&str, &PaperPosition> = gateway_positions
            .iter()
            .map(|p| (p.instrument.as_str(), p))
            .collect();
        let mut checked = HashSet::new();
        let mut discrepancies = Vec::new();

        for position in ledger.list_open() {
            let option = position.traded_instrument.as_str();
            checked.insert(option);

            match held.get(option) {
                Some(paper) if paper.quantity != position.quantity => {
                    tracing::error!(
                        option,
                        ledger = position.quantity,
                        gateway = paper.quantity,
                        "Quantity discrepancy"
                    );
                    discrepancies.push(Discrepancy::QuantityMismatch {
                        option: option.to_string(),
                        ledger: position.quantity,
                        gateway: paper.quantity,
                    });
                }
                Some(_) => {}
                None => {
                    tracing::error!(
                        instrument = %position.underlying_instrument,
                        option,
                        "Ghost position found: the ledger holds a position the gateway does not"
                    );
                    discrepancies.push(Discrepancy::Ghost {
                        instrument: position.underlying_instrument.clone(),
                        option: option.to_string(),
                    });
                }
            }
        }

        for paper in gateway_positions {
            if !checked.contains(paper.instrument.as_str()) {
                tracing::error!(
                    option = %paper.instrument,
                    quantity = paper.quantity,
                    "Untracked position found: the gateway holds a position missing from the ledger"
                );
                discrepancies.push(Discrepancy::Untracked {
                    option: paper.instrument.clone(),
                });
            }
        }

        tracing::info!(count = discrepancies.len(), "Reconciliation check complete.");
        discrepancies
    }
}
