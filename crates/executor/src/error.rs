use api_client::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Order rejected for {instrument}: {reason}")]
    OrderRejected { instrument: String, reason: String },

    #[error("A position is already open for instrument: {0}")]
    PositionAlreadyOpen(String),

    #[error("Position not found for instrument: {0}")]
    PositionNotFound(String),

    #[error("Unknown order id: {0}")]
    OrderNotFound(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}
