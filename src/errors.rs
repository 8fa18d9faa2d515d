use thiserror::Error;
use uuid::Uuid;

/// Error type that captures every recoverable savings-core failure.
///
/// None of these are fatal: an operation that returns one has left the store
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum SavingsError {
    #[error("Goal not found: {0}")]
    NotFound(Uuid),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient balance: requested {requested:.2}, available {available:.2}")]
    InsufficientBalance { requested: f64, available: f64 },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Snapshot storage unavailable: {0}")]
    PersistenceUnavailable(String),
    /// Stored bytes exist but cannot be read as a snapshot.
    #[error("Snapshot `{key}` is malformed: {reason}")]
    MalformedSnapshot { key: String, reason: String },
    #[error("Notification delivery unavailable: {0}")]
    DeliveryUnavailable(String),
}

impl From<std::io::Error> for SavingsError {
    fn from(err: std::io::Error) -> Self {
        SavingsError::PersistenceUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for SavingsError {
    fn from(err: serde_json::Error) -> Self {
        SavingsError::PersistenceUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SavingsError>;
