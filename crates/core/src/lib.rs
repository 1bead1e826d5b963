//! frontdesk-core: booking domain types and the transition table.
//!
//! Pure domain logic with no storage or async dependencies:
//!
//! - [`BookingStatus`] / [`PaymentStatus`] -- lifecycle and financial state,
//!   including normalization of legacy stored payment labels
//! - [`Action`] -- the four recognized front-desk verbs
//! - [`transition()`] -- the action -> (status, payment effect) table
//! - text helpers for log display ([`collapse_whitespace`], [`room_label`])
//!
//! Everything here is deterministic and synchronous; the transition
//! executor in `frontdesk-engine` drives these types against a
//! `BookingStorage` backend.

pub mod action;
pub mod status;
pub mod text;
pub mod transition;

pub use action::Action;
pub use status::{BookingStatus, PaymentStatus};
pub use text::{collapse_whitespace, room_label, ROOM_SENTINEL};
pub use transition::{transition, PaymentEffect, Transition};

/// Crate version reported by the `/health` endpoint.
pub const FRONTDESK_VERSION: &str = env!("CARGO_PKG_VERSION");
