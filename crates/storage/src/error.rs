/// All errors that can be returned by a `BookingStorage` implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No booking with the given id exists.
    #[error("booking not found: {booking_id}")]
    BookingNotFound { booking_id: String },

    /// A booking with this id already exists.
    #[error("booking already exists: {booking_id}")]
    AlreadyExists { booking_id: String },

    /// A backend-specific storage error (connection loss, constraint
    /// violation, refused DDL, serialization failure).
    #[error("storage backend error: {0}")]
    Backend(String),
}
