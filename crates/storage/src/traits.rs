use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{BookingLogRecord, BookingRecord, BookingUpdate, NewLogEntry};

/// The storage trait for booking transition backends.
///
/// A `BookingStorage` implementation provides durable, transactional
/// storage for booking rows and the append-only booking log.
///
/// ## Snapshot Semantics
///
/// All mutating operations take `&mut Self::Snapshot`, a type representing
/// an in-progress transaction. The lifecycle is:
///
/// 1. `begin_snapshot()` — start a transaction, returns a `Snapshot`
/// 2. Call mutating methods with `&mut snapshot`
/// 3. `commit_snapshot(snapshot)` — commit and consume the transaction
///    OR `abort_snapshot(snapshot)` — roll back and consume the transaction
///
/// If a `Snapshot` is dropped without committing, the underlying
/// transaction MUST be rolled back (drop semantics on the underlying DB
/// transaction).
///
/// ## Locking
///
/// `get_booking_for_update` takes an exclusive per-booking lock
/// (`SELECT ... FOR UPDATE` semantics) held until the snapshot commits or
/// aborts. A concurrent transition on the same booking blocks on that
/// lock, so no two transitions can read the same prior state. Transitions
/// on different bookings proceed in parallel; there is no cross-booking or
/// global serialization.
///
/// ## Atomicity
///
/// The booking update and its audit log row must be written in the SAME
/// snapshot. This is what enforces the engine invariant: no status change
/// without a log entry, and neither survives a failed attempt.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait BookingStorage: Send + Sync + 'static {
    /// The snapshot (transaction) type used by this storage backend.
    ///
    /// Must be `Send` to allow passing across async task boundaries.
    type Snapshot: Send;

    // ── Snapshot lifecycle ────────────────────────────────────────────────────

    /// Begin a new snapshot (transaction).
    async fn begin_snapshot(&self) -> Result<Self::Snapshot, StorageError>;

    /// Commit a snapshot, making all mutations durable.
    async fn commit_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;

    /// Abort (roll back) a snapshot, discarding all mutations.
    async fn abort_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;

    // ── Booking operations (within snapshot) ─────────────────────────────────

    /// Insert a new booking row.
    ///
    /// Booking creation belongs to the reservation flow, not the transition
    /// engine; this method exists for that flow, for seeding, and for tests.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` on a duplicate id.
    async fn create_booking(
        &self,
        snapshot: &mut Self::Snapshot,
        record: BookingRecord,
    ) -> Result<(), StorageError>;

    /// Read a booking row, locking it for update.
    ///
    /// The lock is held until the snapshot is committed or aborted.
    ///
    /// Returns `Err(StorageError::BookingNotFound)` if no such booking.
    async fn get_booking_for_update(
        &self,
        snapshot: &mut Self::Snapshot,
        booking_id: &str,
    ) -> Result<BookingRecord, StorageError>;

    /// Apply a field-wise update to a booking row.
    ///
    /// `None` fields are left untouched. Callers are expected to hold the
    /// row lock via `get_booking_for_update` first.
    async fn update_booking(
        &self,
        snapshot: &mut Self::Snapshot,
        booking_id: &str,
        update: BookingUpdate,
    ) -> Result<(), StorageError>;

    /// Append one audit log row, returning its assigned `log_id`.
    ///
    /// Insert-only: log rows are never updated or deleted. Ids are
    /// monotonic and are consumed even when the snapshot later aborts.
    ///
    /// CRITICAL: must be called in the SAME snapshot as the
    /// `update_booking` it describes, so both commit or neither does.
    async fn append_log(
        &self,
        snapshot: &mut Self::Snapshot,
        entry: NewLogEntry,
    ) -> Result<i64, StorageError>;

    // ── Schema capability surface ────────────────────────────────────────────

    /// The set of values the `payment_status` column currently accepts,
    /// in definition order.
    ///
    /// Must reflect the live schema, not a hardcoded assumption; the
    /// engine re-probes on every transition.
    async fn payment_status_values(&self) -> Result<Vec<String>, StorageError>;

    /// Whether the bookings table has the named column.
    async fn has_booking_column(&self, column: &str) -> Result<bool, StorageError>;

    /// Whether the booking log table has the named column.
    async fn has_log_column(&self, column: &str) -> Result<bool, StorageError>;

    /// Best-effort: widen the `payment_status` column to accept all three
    /// canonical values.
    ///
    /// Backends without DDL rights return `Err(StorageError::Backend)`;
    /// callers treat that as non-fatal and fall back to legacy labels.
    async fn widen_payment_status_values(&self) -> Result<(), StorageError>;

    // ── Query operations (outside snapshot, against pool/connection) ──────────

    /// Read a booking row without locking.
    ///
    /// Returns `Err(StorageError::BookingNotFound)` if no such booking.
    async fn get_booking(&self, booking_id: &str) -> Result<BookingRecord, StorageError>;

    /// List all bookings, newest `created_at` first.
    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, StorageError>;

    /// List all audit log rows in insertion order.
    async fn list_logs(&self) -> Result<Vec<BookingLogRecord>, StorageError>;
}
