use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A booking row as stored in the backend.
///
/// `status` and `payment_status` are the raw stored labels: legacy payment
/// labels (`Paid`, `Completed`, `Not Paid`) may appear on deployments that
/// predate the enum migration and are preserved as-is until the next
/// recognized action rewrites them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: String,
    /// Owning guest; many bookings per guest.
    pub user_id: String,
    pub guest_name: String,
    pub email: String,
    /// Assigned room, if any. Room assignment may be deferred.
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub status: String,
    pub payment_status: String,
    /// ISO 8601 date string (the planned stay window).
    pub check_in: String,
    /// ISO 8601 date string.
    pub check_out: String,
    /// ISO 8601 timestamp of the actual check-in event. Only populated on
    /// schemas that carry the `check_in_time` column.
    pub check_in_time: Option<String>,
    /// ISO 8601 timestamp of the actual check-out event.
    pub check_out_time: Option<String>,
    pub total_price: Decimal,
    pub adults: u32,
    pub children: u32,
    /// ISO 8601 timestamp, immutable, set at creation.
    pub created_at: String,
}

/// One immutable audit log row. Never updated or deleted once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingLogRecord {
    /// Auto-assigned, monotonic. Ids are consumed even by aborted
    /// transactions (AUTO_INCREMENT semantics).
    pub log_id: i64,
    pub booking_id: String,
    /// Whitespace-normalized to a single line at append time.
    pub guest_name: String,
    /// Present only on schemas that carry the `email` log column.
    pub email: Option<String>,
    /// Raw room number (may be empty). Present only on schemas that carry
    /// the `room_number` log column.
    pub room_number: Option<String>,
    /// The label actually persisted to the booking row, which may be a
    /// legacy alias of the logical target value.
    pub payment_status: String,
    pub status: String,
    /// Display label: "Room {n}", the room type name, or the "—" sentinel.
    pub room: String,
    pub check_in: String,
    pub check_out: String,
    /// Human action label: Paid / Check-in / Check-out / Cancel.
    pub last_action: String,
    /// ISO 8601 timestamp, server time at append.
    pub action_timestamp: String,
    pub performed_by: String,
}

/// Insert shape for one audit log row.
///
/// `email` and `room_number` are populated by the appender only when the
/// live log schema carries those columns; the backend must not invent
/// values for absent columns.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub booking_id: String,
    pub guest_name: String,
    pub email: Option<String>,
    pub room_number: Option<String>,
    pub payment_status: String,
    pub status: String,
    pub room: String,
    pub check_in: String,
    pub check_out: String,
    pub last_action: String,
    pub action_timestamp: String,
    pub performed_by: String,
}

/// Field-wise update applied to a booking row by the transition executor.
///
/// The optional sub-writes are populated only when the corresponding
/// column exists in the live schema; `None` means "leave untouched".
#[derive(Debug, Clone, Default)]
pub struct BookingUpdate {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    /// Date-only rewrite of the booking's planned check-out.
    pub check_out: Option<String>,
}
