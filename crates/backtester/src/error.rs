use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Engine error during backtest: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Failed to read data set: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data set: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data set: {0}")]
    InvalidData(String),

    #[error("Backtest range {from} to {to} is empty")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),

    #[error("Historical data for the requested range is incomplete or missing.")]
    DataUnavailable,
}

impl From<indicatif::style::TemplateError> for BacktestError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        BacktestError::ProgressBarTemplate(error.to_string())
    }
}
