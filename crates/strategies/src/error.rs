use executor::ExecutorError;
use risk::RiskError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Template received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Order routing failed: {0}")]
    Executor(#[from] ExecutorError),

    #[error("Stop-loss calculation failed: {0}")]
    Risk(#[from] RiskError),
}
