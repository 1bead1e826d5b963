//! Schema capability profiles for the in-memory backend.
//!
//! Real deployments sit at different migration points: the payment-status
//! enum may only accept the legacy value set, and the optional timestamp
//! and log columns may be missing. A `SchemaProfile` describes one such
//! deployment so tests and demos can exercise both shapes without a
//! database.

use std::collections::BTreeSet;

/// Booking-table columns every deployment has.
const BOOKING_BASE_COLUMNS: &[&str] = &[
    "booking_id",
    "user_id",
    "status",
    "payment_status",
    "check_in",
    "check_out",
    "total_price",
    "adults",
    "children",
    "created_at",
];

/// Log-table columns every deployment has.
const LOG_BASE_COLUMNS: &[&str] = &[
    "log_id",
    "booking_id",
    "guest_name",
    "payment_status",
    "status",
    "room",
    "check_in",
    "check_out",
    "last_action",
    "action_timestamp",
    "performed_by",
];

/// The set of columns and enum values a simulated deployment supports.
#[derive(Debug, Clone)]
pub struct SchemaProfile {
    /// Values the `payment_status` column accepts, in definition order.
    pub payment_status_values: Vec<String>,
    pub booking_columns: BTreeSet<String>,
    pub log_columns: BTreeSet<String>,
    /// Whether `widen_payment_status_values` is permitted (DDL rights).
    pub allow_widen: bool,
}

impl SchemaProfile {
    /// Fully migrated schema: canonical enum values, actual-event timestamp
    /// columns, and the email/room_number log columns.
    pub fn migrated() -> Self {
        let mut booking_columns: BTreeSet<String> =
            BOOKING_BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        booking_columns.insert("check_in_time".to_string());
        booking_columns.insert("check_out_time".to_string());

        let mut log_columns: BTreeSet<String> =
            LOG_BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
        log_columns.insert("email".to_string());
        log_columns.insert("room_number".to_string());

        Self {
            payment_status_values: vec![
                "Pending".to_string(),
                "Partial Payment".to_string(),
                "Payment Complete".to_string(),
            ],
            booking_columns,
            log_columns,
            allow_widen: true,
        }
    }

    /// Pre-migration schema: legacy enum values only, no actual-event
    /// timestamp columns, no email/room_number log columns, and no DDL
    /// rights (widening fails).
    pub fn legacy() -> Self {
        Self {
            payment_status_values: vec![
                "Pending".to_string(),
                "Paid".to_string(),
                "Completed".to_string(),
            ],
            booking_columns: BOOKING_BASE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            log_columns: LOG_BASE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            allow_widen: false,
        }
    }

    /// Legacy enum values but with DDL rights, so a widen attempt succeeds.
    pub fn legacy_widenable() -> Self {
        Self {
            allow_widen: true,
            ..Self::legacy()
        }
    }
}

impl Default for SchemaProfile {
    fn default() -> Self {
        Self::migrated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrated_profile_has_optional_columns() {
        let p = SchemaProfile::migrated();
        assert!(p.booking_columns.contains("check_in_time"));
        assert!(p.booking_columns.contains("check_out_time"));
        assert!(p.log_columns.contains("email"));
        assert!(p.log_columns.contains("room_number"));
    }

    #[test]
    fn legacy_profile_lacks_optional_columns_and_canonical_values() {
        let p = SchemaProfile::legacy();
        assert!(!p.booking_columns.contains("check_in_time"));
        assert!(!p.log_columns.contains("email"));
        assert!(!p.payment_status_values.iter().any(|v| v == "Partial Payment"));
        assert!(p.payment_status_values.iter().any(|v| v == "Paid"));
        assert!(!p.allow_widen);
    }

    #[test]
    fn base_columns_always_present() {
        for p in [SchemaProfile::migrated(), SchemaProfile::legacy()] {
            assert!(p.booking_columns.contains("payment_status"));
            assert!(p.log_columns.contains("last_action"));
        }
    }
}
