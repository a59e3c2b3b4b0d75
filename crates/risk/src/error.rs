use executor::ExecutorError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Risk parameters from configuration are invalid: {0}")]
    InvalidParameters(String),

    #[error("The provided entry price ({0}) is zero or negative.")]
    InvalidEntryPrice(Decimal),

    #[error("Calculated stop-loss price is invalid: {0}")]
    InvalidStopLoss(String),

    #[error("Stop-loss exit failed: {0}")]
    Executor(#[from] ExecutorError),
}
