use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Invalid discount rate: {0}")]
    InvalidRate(f64),
}
