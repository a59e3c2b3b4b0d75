use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transport failure talking to the broker: {0}")]
    Transport(String),

    #[error("The broker rejected the request: {0}")]
    Rejected(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No data available for '{0}'")]
    NotFound(String),
}
