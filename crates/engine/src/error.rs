use frontdesk_storage::StorageError;

/// Errors surfaced by the transition engine.
///
/// `InvalidAction`, `NotFound`, and `InvalidTimestamp` are detected before
/// any write and map to client errors; `Storage` covers everything the
/// backend rejects mid-transaction, after which the whole transaction has
/// been rolled back.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Action string is not one of the four recognized verbs.
    #[error("invalid action: '{action}'")]
    InvalidAction { action: String },

    /// No booking with the given id.
    #[error("booking not found: {booking_id}")]
    NotFound { booking_id: String },

    /// The optional `datetime` field could not be parsed.
    #[error("invalid datetime: '{value}'")]
    InvalidTimestamp { value: String },

    /// Persistence failure; the transaction was fully rolled back.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Whether this error is a client-side validation failure (no write
    /// was attempted) rather than a persistence failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidAction { .. }
                | EngineError::NotFound { .. }
                | EngineError::InvalidTimestamp { .. }
        )
    }
}
