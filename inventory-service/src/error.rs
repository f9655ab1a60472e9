use std::time::Duration;

/// Infrastructure failures reported by an [`InventoryStore`](crate::store::InventoryStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Failures of a reservation request. Duplicate and insufficient outcomes are
/// not errors and live in [`Outcome`](crate::handlers::Outcome).
#[derive(Debug, thiserror::Error)]
pub enum ReserveError {
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

impl From<StoreError> for ReserveError {
    fn from(err: StoreError) -> Self {
        ReserveError::StoreUnavailable {
            reason: err.to_string(),
        }
    }
}
