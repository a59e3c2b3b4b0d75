use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Trade {0} exits before it enters")]
    InvalidTrade(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
