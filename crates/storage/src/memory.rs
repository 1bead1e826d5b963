//! In-memory `BookingStorage` backend.
//!
//! Backs tests, demos, and the conformance suite. Transactions buffer
//! their writes in the snapshot and apply them on commit; dropping a
//! snapshot without committing discards everything (rollback by default).
//! FOR-UPDATE semantics come from a per-booking `tokio::Mutex` whose guard
//! lives inside the snapshot, so the lock releases exactly when the
//! transaction ends.
//!
//! The backend is constructed with a [`SchemaProfile`] and enforces it the
//! way MySQL would: writes naming a column the profile lacks are rejected,
//! and widening the payment enum fails without DDL rights. This keeps the
//! engine's capability negotiation honest in tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::error::StorageError;
use crate::record::{BookingLogRecord, BookingRecord, BookingUpdate, NewLogEntry};
use crate::schema::SchemaProfile;
use crate::traits::BookingStorage;

/// In-memory transactional booking store.
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
    row_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

struct Inner {
    bookings: BTreeMap<String, BookingRecord>,
    logs: Vec<BookingLogRecord>,
    next_log_id: i64,
    schema: SchemaProfile,
}

/// Buffered transaction state. Dropping this without committing rolls the
/// transaction back: pending writes are discarded and row locks release.
pub struct MemorySnapshot {
    pending: Vec<PendingWrite>,
    locks: HashMap<String, OwnedMutexGuard<()>>,
}

enum PendingWrite {
    Create(BookingRecord),
    Update {
        booking_id: String,
        update: BookingUpdate,
    },
    AppendLog(BookingLogRecord),
}

impl MemoryStorage {
    /// A store with the fully migrated schema.
    pub fn new() -> Self {
        Self::with_profile(SchemaProfile::migrated())
    }

    /// A store simulating the given deployment schema.
    pub fn with_profile(schema: SchemaProfile) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                bookings: BTreeMap::new(),
                logs: Vec::new(),
                next_log_id: 1,
                schema,
            })),
            row_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Backend("storage mutex poisoned".to_string()))
    }

    fn row_lock(&self, booking_id: &str) -> Result<Arc<tokio::sync::Mutex<()>>, StorageError> {
        let mut map = self
            .row_locks
            .lock()
            .map_err(|_| StorageError::Backend("lock table mutex poisoned".to_string()))?;
        Ok(map
            .entry(booking_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingStorage for MemoryStorage {
    type Snapshot = MemorySnapshot;

    async fn begin_snapshot(&self) -> Result<MemorySnapshot, StorageError> {
        Ok(MemorySnapshot {
            pending: Vec::new(),
            locks: HashMap::new(),
        })
    }

    async fn commit_snapshot(&self, snapshot: MemorySnapshot) -> Result<(), StorageError> {
        let mut inner = self.lock_inner()?;
        for write in snapshot.pending {
            match write {
                PendingWrite::Create(record) => {
                    if inner.bookings.contains_key(&record.booking_id) {
                        return Err(StorageError::AlreadyExists {
                            booking_id: record.booking_id,
                        });
                    }
                    inner.bookings.insert(record.booking_id.clone(), record);
                }
                PendingWrite::Update { booking_id, update } => {
                    let booking = inner.bookings.get_mut(&booking_id).ok_or(
                        StorageError::BookingNotFound {
                            booking_id: booking_id.clone(),
                        },
                    )?;
                    if let Some(status) = update.status {
                        booking.status = status;
                    }
                    if let Some(payment_status) = update.payment_status {
                        booking.payment_status = payment_status;
                    }
                    if let Some(check_in_time) = update.check_in_time {
                        booking.check_in_time = Some(check_in_time);
                    }
                    if let Some(check_out_time) = update.check_out_time {
                        booking.check_out_time = Some(check_out_time);
                    }
                    if let Some(check_out) = update.check_out {
                        booking.check_out = check_out;
                    }
                }
                PendingWrite::AppendLog(record) => {
                    inner.logs.push(record);
                }
            }
        }
        // Row locks in snapshot.locks release here as the snapshot drops.
        Ok(())
    }

    async fn abort_snapshot(&self, snapshot: MemorySnapshot) -> Result<(), StorageError> {
        // Pending writes are discarded and row locks release on drop.
        drop(snapshot);
        Ok(())
    }

    async fn create_booking(
        &self,
        snapshot: &mut MemorySnapshot,
        record: BookingRecord,
    ) -> Result<(), StorageError> {
        {
            let inner = self.lock_inner()?;
            if inner.bookings.contains_key(&record.booking_id) {
                return Err(StorageError::AlreadyExists {
                    booking_id: record.booking_id,
                });
            }
        }
        let duplicate_pending = snapshot.pending.iter().any(|w| {
            matches!(w, PendingWrite::Create(r) if r.booking_id == record.booking_id)
        });
        if duplicate_pending {
            return Err(StorageError::AlreadyExists {
                booking_id: record.booking_id,
            });
        }
        snapshot.pending.push(PendingWrite::Create(record));
        Ok(())
    }

    async fn get_booking_for_update(
        &self,
        snapshot: &mut MemorySnapshot,
        booking_id: &str,
    ) -> Result<BookingRecord, StorageError> {
        // Re-locking a row this snapshot already holds must not self-deadlock.
        if !snapshot.locks.contains_key(booking_id) {
            let lock = self.row_lock(booking_id)?;
            let guard = lock.lock_owned().await;
            snapshot.locks.insert(booking_id.to_string(), guard);
        }
        let inner = self.lock_inner()?;
        inner
            .bookings
            .get(booking_id)
            .cloned()
            .ok_or(StorageError::BookingNotFound {
                booking_id: booking_id.to_string(),
            })
    }

    async fn update_booking(
        &self,
        snapshot: &mut MemorySnapshot,
        booking_id: &str,
        update: BookingUpdate,
    ) -> Result<(), StorageError> {
        let inner = self.lock_inner()?;
        if !inner.bookings.contains_key(booking_id) {
            return Err(StorageError::BookingNotFound {
                booking_id: booking_id.to_string(),
            });
        }
        // Enforce the profile the way MySQL would reject an unknown column.
        if update.check_in_time.is_some() && !inner.schema.booking_columns.contains("check_in_time")
        {
            return Err(StorageError::Backend(
                "unknown column 'check_in_time' in bookings".to_string(),
            ));
        }
        if update.check_out_time.is_some()
            && !inner.schema.booking_columns.contains("check_out_time")
        {
            return Err(StorageError::Backend(
                "unknown column 'check_out_time' in bookings".to_string(),
            ));
        }
        if let Some(payment_status) = &update.payment_status {
            if !inner
                .schema
                .payment_status_values
                .iter()
                .any(|v| v == payment_status)
            {
                return Err(StorageError::Backend(format!(
                    "data truncated: '{}' not in payment_status enum",
                    payment_status
                )));
            }
        }
        drop(inner);
        snapshot.pending.push(PendingWrite::Update {
            booking_id: booking_id.to_string(),
            update,
        });
        Ok(())
    }

    async fn append_log(
        &self,
        snapshot: &mut MemorySnapshot,
        entry: NewLogEntry,
    ) -> Result<i64, StorageError> {
        let mut inner = self.lock_inner()?;
        if entry.email.is_some() && !inner.schema.log_columns.contains("email") {
            return Err(StorageError::Backend(
                "unknown column 'email' in booking_logs".to_string(),
            ));
        }
        if entry.room_number.is_some() && !inner.schema.log_columns.contains("room_number") {
            return Err(StorageError::Backend(
                "unknown column 'room_number' in booking_logs".to_string(),
            ));
        }
        // Ids burn even if the snapshot later aborts (AUTO_INCREMENT).
        let log_id = inner.next_log_id;
        inner.next_log_id += 1;
        drop(inner);

        snapshot.pending.push(PendingWrite::AppendLog(BookingLogRecord {
            log_id,
            booking_id: entry.booking_id,
            guest_name: entry.guest_name,
            email: entry.email,
            room_number: entry.room_number,
            payment_status: entry.payment_status,
            status: entry.status,
            room: entry.room,
            check_in: entry.check_in,
            check_out: entry.check_out,
            last_action: entry.last_action,
            action_timestamp: entry.action_timestamp,
            performed_by: entry.performed_by,
        }));
        Ok(log_id)
    }

    async fn payment_status_values(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock_inner()?.schema.payment_status_values.clone())
    }

    async fn has_booking_column(&self, column: &str) -> Result<bool, StorageError> {
        Ok(self.lock_inner()?.schema.booking_columns.contains(column))
    }

    async fn has_log_column(&self, column: &str) -> Result<bool, StorageError> {
        Ok(self.lock_inner()?.schema.log_columns.contains(column))
    }

    async fn widen_payment_status_values(&self) -> Result<(), StorageError> {
        let mut inner = self.lock_inner()?;
        if !inner.schema.allow_widen {
            return Err(StorageError::Backend(
                "ALTER TABLE refused: insufficient privileges".to_string(),
            ));
        }
        inner.schema.payment_status_values = vec![
            "Pending".to_string(),
            "Partial Payment".to_string(),
            "Payment Complete".to_string(),
        ];
        Ok(())
    }

    async fn get_booking(&self, booking_id: &str) -> Result<BookingRecord, StorageError> {
        self.lock_inner()?
            .bookings
            .get(booking_id)
            .cloned()
            .ok_or(StorageError::BookingNotFound {
                booking_id: booking_id.to_string(),
            })
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, StorageError> {
        let inner = self.lock_inner()?;
        let mut bookings: Vec<BookingRecord> = inner.bookings.values().cloned().collect();
        bookings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.booking_id.cmp(&b.booking_id))
        });
        Ok(bookings)
    }

    async fn list_logs(&self) -> Result<Vec<BookingLogRecord>, StorageError> {
        Ok(self.lock_inner()?.logs.clone())
    }
}
