//! Audit log appender.
//!
//! Builds the one immutable log row that accompanies every transition.
//! The row snapshots guest/room context at transition time so the log
//! stays meaningful even after the booking mutates further. The insert is
//! schema-adaptive: the optional `email` and `room_number` columns are
//! probed before composing the entry, never assumed.

use frontdesk_core::{collapse_whitespace, room_label, Action, BookingStatus};
use frontdesk_storage::{BookingRecord, BookingStorage, NewLogEntry, StorageError};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

/// Actor recorded when no richer identity is available.
pub const DEFAULT_ACTOR: &str = "Admin";

/// Server time at append, RFC 3339 UTC. Never client-supplied, so log
/// ordering stays trustworthy.
pub(crate) fn now_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| format!("{now:?}"))
}

/// Current server date, `YYYY-MM-DD`.
pub(crate) fn today() -> String {
    let date = OffsetDateTime::now_utc().date();
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| format!("{date}"))
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Pick the log's check-in/check-out value: actual-event timestamp if
/// present, else the booking's original date, else today as last resort.
fn stay_value(event_time: Option<&str>, booking_date: &str) -> String {
    event_time
        .and_then(non_empty)
        .or_else(|| non_empty(booking_date))
        .map(|v| v.to_string())
        .unwrap_or_else(today)
}

/// Build the log row for one transition.
///
/// `booking` is the pre-update snapshot (joined guest/room context);
/// `check_in_time` / `check_out_time` are the post-update actual-event
/// timestamps, when the schema carries them.
pub async fn build_entry<S: BookingStorage>(
    storage: &S,
    booking: &BookingRecord,
    new_status: BookingStatus,
    stored_payment: &str,
    action: Action,
    check_in_time: Option<&str>,
    check_out_time: Option<&str>,
) -> Result<NewLogEntry, StorageError> {
    let email = if storage.has_log_column("email").await? {
        Some(booking.email.clone())
    } else {
        None
    };
    // Raw room number (or empty string) so logs can be queried by number.
    let room_number = if storage.has_log_column("room_number").await? {
        Some(booking.room_number.clone().unwrap_or_default())
    } else {
        None
    };

    Ok(NewLogEntry {
        booking_id: booking.booking_id.clone(),
        guest_name: collapse_whitespace(&booking.guest_name),
        email,
        room_number,
        payment_status: stored_payment.to_string(),
        status: new_status.as_str().to_string(),
        room: room_label(booking.room_number.as_deref(), booking.room_type.as_deref()),
        check_in: stay_value(check_in_time, &booking.check_in),
        check_out: stay_value(check_out_time, &booking.check_out),
        last_action: action.label().to_string(),
        action_timestamp: now_timestamp(),
        performed_by: DEFAULT_ACTOR.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use frontdesk_storage::{MemoryStorage, SchemaProfile};
    use rust_decimal::Decimal;

    use super::*;

    fn booking() -> BookingRecord {
        BookingRecord {
            booking_id: "b-1".to_string(),
            user_id: "u-1".to_string(),
            guest_name: "Maria\ndel  Carmen".to_string(),
            email: "maria@example.com".to_string(),
            room_number: Some("204".to_string()),
            room_type: Some("Deluxe".to_string()),
            status: "Confirmed".to_string(),
            payment_status: "Pending".to_string(),
            check_in: "2024-03-01".to_string(),
            check_out: "2024-03-05".to_string(),
            check_in_time: None,
            check_out_time: None,
            total_price: Decimal::new(30000, 2),
            adults: 2,
            children: 0,
            created_at: "2024-02-20T09:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn entry_snapshots_normalized_guest_and_room() {
        let storage = MemoryStorage::new();
        let entry = build_entry(
            &storage,
            &booking(),
            BookingStatus::Confirmed,
            "Partial Payment",
            Action::Paid,
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(entry.guest_name, "Maria del Carmen");
        assert_eq!(entry.room, "Room 204");
        assert_eq!(entry.last_action, "Paid");
        assert_eq!(entry.performed_by, DEFAULT_ACTOR);
        assert_eq!(entry.email.as_deref(), Some("maria@example.com"));
        assert_eq!(entry.room_number.as_deref(), Some("204"));
    }

    #[tokio::test]
    async fn optional_columns_omitted_on_legacy_schema() {
        let storage = MemoryStorage::with_profile(SchemaProfile::legacy());
        let entry = build_entry(
            &storage,
            &booking(),
            BookingStatus::Cancelled,
            "Pending",
            Action::Cancel,
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(entry.email, None);
        assert_eq!(entry.room_number, None);
    }

    #[tokio::test]
    async fn stay_values_prefer_event_timestamps() {
        let storage = MemoryStorage::new();
        let entry = build_entry(
            &storage,
            &booking(),
            BookingStatus::CheckedIn,
            "Partial Payment",
            Action::CheckIn,
            Some("2024-03-01T14:00:00"),
            None,
        )
        .await
        .unwrap();

        assert_eq!(entry.check_in, "2024-03-01T14:00:00");
        assert_eq!(entry.check_out, "2024-03-05");
    }

    #[tokio::test]
    async fn stay_values_fall_back_to_today_when_dates_missing() {
        let storage = MemoryStorage::new();
        let mut record = booking();
        record.check_in = String::new();
        let entry = build_entry(
            &storage,
            &record,
            BookingStatus::Confirmed,
            "Partial Payment",
            Action::Paid,
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(entry.check_in, today());
    }

    #[tokio::test]
    async fn empty_room_number_stored_raw_with_type_label() {
        let storage = MemoryStorage::new();
        let mut record = booking();
        record.room_number = None;
        let entry = build_entry(
            &storage,
            &record,
            BookingStatus::Confirmed,
            "Partial Payment",
            Action::Paid,
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(entry.room_number.as_deref(), Some(""));
        assert_eq!(entry.room, "Deluxe");
    }
}
