//! frontdesk-storage: the `BookingStorage` trait and backends.
//!
//! Defines the transactional storage contract the transition engine runs
//! against: snapshot (transaction) lifecycle, locked booking reads,
//! append-only audit log writes, and a schema capability surface that lets
//! the engine adapt to partially migrated deployments. Ships an in-memory
//! backend for tests, demos, and the conformance suite.

pub mod conformance;
mod error;
mod memory;
mod record;
mod schema;
mod traits;

pub use error::StorageError;
pub use memory::MemoryStorage;
pub use record::{BookingRecord, BookingLogRecord, BookingUpdate, NewLogEntry};
pub use schema::SchemaProfile;
pub use traits::BookingStorage;
