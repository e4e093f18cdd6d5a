use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine error taxonomy. All variants are non-fatal to the enclosing
/// application: read paths degrade to empty results where reasonable, and
/// batch-cycle failures are retried on the next scheduled tick.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Content not found: {0}")]
    ContentNotFound(Uuid),

    /// Not enough interactions/content for a meaningful result. Callers
    /// should treat this as "empty result", not retry.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An internal invariant was violated during aggregation (e.g. the
    /// corpus fetch failed mid-cycle).
    #[error("Calculation failed: {0}")]
    CalculationFailed(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Unknown(err.to_string())
    }
}
