//! frontdesk-engine: the booking transition engine.
//!
//! Drives `frontdesk-core`'s transition table against a `BookingStorage`
//! backend:
//!
//! - [`apply_transition()`] -- the transition executor: locked read,
//!   transition table, schema-compatibility shim, capability-checked
//!   booking update, audit log append, all in one transaction
//! - [`shim`] -- maps logical payment labels onto whatever value set the
//!   live payment_status column accepts
//! - [`audit`] -- builds the immutable log row for each transition
//! - [`query`] / [`export`] -- read-side filtering, sorting, pagination,
//!   and CSV serialization over the audit log

pub mod audit;
mod error;
mod executor;
pub mod export;
pub mod query;
pub mod shim;

pub use error::EngineError;
pub use executor::{apply_transition, TransitionOutcome, TransitionRequest};
