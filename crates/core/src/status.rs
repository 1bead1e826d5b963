//! Booking lifecycle and payment states.
//!
//! Statuses are persisted as their display labels (the storage layer is
//! stringly-typed at the record boundary), so `as_str` / `parse` round-trip
//! through the exact labels the admin UI shows. Payment statuses carry an
//! extra wrinkle: deployments that predate the enum migration store legacy
//! labels (`Paid`, `Completed`, `Not Paid`) which must read as aliases of
//! the canonical values.

use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Booking status
// ──────────────────────────────────────────────

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    #[serde(rename = "Confirmed")]
    Confirmed,
    #[serde(rename = "Checked-in")]
    CheckedIn,
    #[serde(rename = "Checked-out")]
    CheckedOut,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl BookingStatus {
    /// Canonical stored/displayed label.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::CheckedIn => "Checked-in",
            BookingStatus::CheckedOut => "Checked-out",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    /// Parse a stored label. Returns `None` for anything unrecognized.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Confirmed" => Some(BookingStatus::Confirmed),
            "Checked-in" => Some(BookingStatus::CheckedIn),
            "Checked-out" => Some(BookingStatus::CheckedOut),
            "Cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Payment status
// ──────────────────────────────────────────────

/// Financial state of a booking.
///
/// Logically independent of [`BookingStatus`] but constrained jointly by
/// the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Partial Payment")]
    PartialPayment,
    #[serde(rename = "Payment Complete")]
    PaymentComplete,
}

impl PaymentStatus {
    /// Canonical stored/displayed label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::PartialPayment => "Partial Payment",
            PaymentStatus::PaymentComplete => "Payment Complete",
        }
    }

    /// Normalize a stored label to its canonical value.
    ///
    /// Legacy deployments stored `Paid` / `Completed` / `Not Paid`; those
    /// read as aliases of the canonical values. Unknown labels return
    /// `None` and are preserved as-is by callers.
    pub fn normalize(stored: &str) -> Option<Self> {
        match stored {
            "Pending" | "Not Paid" => Some(PaymentStatus::Pending),
            "Partial Payment" | "Paid" => Some(PaymentStatus::PartialPayment),
            "Payment Complete" | "Completed" => Some(PaymentStatus::PaymentComplete),
            _ => None,
        }
    }

    /// The legacy enum label equivalent to this value, where one exists.
    ///
    /// Used by the schema-compatibility shim when the live column only
    /// accepts the pre-migration value set.
    pub fn legacy_alias(&self) -> Option<&'static str> {
        match self {
            PaymentStatus::PartialPayment => Some("Paid"),
            PaymentStatus::PaymentComplete => Some("Completed"),
            PaymentStatus::Pending => None,
        }
    }

    /// All three canonical labels, in enum-definition order.
    pub fn canonical_labels() -> [&'static str; 3] {
        ["Pending", "Partial Payment", "Payment Complete"]
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
