//! Schema-compatibility shim for the payment_status enum.
//!
//! Deployments at different migration points accept different value sets
//! for the payment_status column. Before writing, the executor probes the
//! live value set (no caching; DDL can happen out of band) and maps the
//! logical target label onto something the column will accept, so the
//! write never fails on an enum mismatch. The audit log then records the
//! label that was *actually* stored, keeping history consistent with what
//! is queryable from the bookings table.

use frontdesk_storage::{BookingStorage, StorageError};

/// The canonical value set, assumed when the schema cannot be probed.
const CANONICAL_VALUES: [&str; 3] = ["Pending", "Partial Payment", "Payment Complete"];

fn canonical_values() -> Vec<String> {
    CANONICAL_VALUES.iter().map(|v| v.to_string()).collect()
}

/// Probe the value set the live payment_status column accepts.
///
/// If the canonical pair is missing, makes one best-effort attempt to
/// widen the column (auto-committing DDL, so this runs before the
/// transaction opens). A failed widen is logged and ignored; the caller
/// proceeds with the narrower set and [`storage_label`] falls back to
/// legacy labels. A failed or empty probe assumes the canonical set.
pub async fn allowed_payment_values<S: BookingStorage>(storage: &S) -> Vec<String> {
    let mut values = match storage.payment_status_values().await {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Warning: failed to probe payment_status values: {e}");
            return canonical_values();
        }
    };

    let has_canonical_pair = values.iter().any(|v| v == "Partial Payment")
        && values.iter().any(|v| v == "Payment Complete");
    if !has_canonical_pair {
        match storage.widen_payment_status_values().await {
            Ok(()) => match storage.payment_status_values().await {
                Ok(widened) => values = widened,
                Err(e) => {
                    eprintln!("Warning: failed to re-probe payment_status values: {e}");
                    return canonical_values();
                }
            },
            Err(StorageError::Backend(msg)) => {
                eprintln!("Warning: failed to widen payment_status enum: {msg}");
            }
            Err(e) => {
                eprintln!("Warning: failed to widen payment_status enum: {e}");
            }
        }
    }

    if values.is_empty() {
        return canonical_values();
    }
    values
}

/// Map a logical target label onto a value the live column accepts.
///
/// The target is used verbatim when supported; otherwise the legacy
/// aliases `Paid` / `Completed` stand in for `Partial Payment` /
/// `Payment Complete`, then `Pending`, then the first accepted value so
/// the write never stores an empty string.
pub fn storage_label(target: &str, allowed: &[String]) -> String {
    if allowed.is_empty() || allowed.iter().any(|v| v == target) {
        return target.to_string();
    }
    if target == "Partial Payment" && allowed.iter().any(|v| v == "Paid") {
        return "Paid".to_string();
    }
    if target == "Payment Complete" && allowed.iter().any(|v| v == "Completed") {
        return "Completed".to_string();
    }
    if allowed.iter().any(|v| v == "Pending") {
        return "Pending".to_string();
    }
    allowed[0].clone()
}
