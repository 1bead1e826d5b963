//! CSV serialization of audit log rows.
//!
//! Hand-rolled RFC-4180 writer: the export is a fixed 11-column table and
//! the quoting rules fit in a dozen lines. The header is emitted even for
//! an empty result set so downstream spreadsheets always see the shape.

use frontdesk_storage::BookingLogRecord;

pub const CSV_HEADER: [&str; 11] = [
    "Log ID",
    "Booking ID",
    "Guest Name",
    "Payment Status",
    "Status",
    "Room",
    "Check-In",
    "Check-Out",
    "Last Action",
    "Timestamp",
    "Performed By",
];

/// Quote a field when it contains a delimiter, quote, or line break;
/// embedded quotes are doubled.
fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\r') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape(field));
    }
    out.push_str("\r\n");
}

/// Serialize rows (already filtered and sorted) to a CSV document.
pub fn export_csv(rows: &[BookingLogRecord]) -> String {
    let mut out = String::new();
    push_row(&mut out, &CSV_HEADER);
    for row in rows {
        let log_id = row.log_id.to_string();
        push_row(
            &mut out,
            &[
                &log_id,
                &row.booking_id,
                &row.guest_name,
                &row.payment_status,
                &row.status,
                &row.room,
                &row.check_in,
                &row.check_out,
                &row.last_action,
                &row.action_timestamp,
                &row.performed_by,
            ],
        );
    }
    out
}
