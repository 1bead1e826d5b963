//! The transition executor.
//!
//! One call = one transaction: lock the booking row, run the transition
//! table, resolve the storage-safe payment label, apply the
//! capability-checked update, append exactly one audit log row, commit.
//! Any failure inside the transaction rolls everything back — booking and
//! log always mutate together or not at all.

use frontdesk_core::{transition, Action, BookingStatus, PaymentEffect};
use frontdesk_storage::{BookingStorage, BookingUpdate, StorageError};
use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::audit;
use crate::error::EngineError;
use crate::shim;

/// Normalized transition request.
///
/// Raw request bodies arrive duck-typed (mixed casing, stray whitespace,
/// optional fields); everything is normalized here before the transition
/// table sees it.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub booking_id: String,
    /// Raw action verb; trimmed and lowercased during validation.
    pub action: String,
    /// Optional actual-event timestamp. Only meaningful for
    /// checkin/checkout; ignored for other actions.
    pub datetime: Option<String>,
}

/// Result of a committed transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub status: BookingStatus,
    /// Logical payment label, as reported to clients. For cancel this is
    /// the carried-over stored label, legacy or not.
    pub payment_status: String,
    /// The label actually persisted (post schema-compatibility mapping)
    /// and recorded in the audit log.
    pub stored_payment_status: String,
    pub log_id: i64,
}

/// A parsed `datetime` field: the normalized timestamp plus its date part.
struct EventTime {
    timestamp: String,
    date: String,
}

fn parse_event_timestamp(raw: &str) -> Result<EventTime, EngineError> {
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let parsed = PrimitiveDateTime::parse(raw, fmt)
        .or_else(|_| PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT))
        .map_err(|_| EngineError::InvalidTimestamp {
            value: raw.to_string(),
        })?;
    let timestamp = parsed.format(fmt).map_err(|_| EngineError::InvalidTimestamp {
        value: raw.to_string(),
    })?;
    let date = parsed
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|_| EngineError::InvalidTimestamp {
            value: raw.to_string(),
        })?;
    Ok(EventTime { timestamp, date })
}

/// Apply one front-desk action to a booking.
///
/// Validation failures (`InvalidAction`, `NotFound`, `InvalidTimestamp`)
/// are detected before any write. Everything else runs inside a single
/// snapshot that either commits both the booking update and its log row,
/// or neither.
pub async fn apply_transition<S: BookingStorage>(
    storage: &S,
    request: &TransitionRequest,
) -> Result<TransitionOutcome, EngineError> {
    let action = Action::parse(&request.action).ok_or_else(|| EngineError::InvalidAction {
        action: request.action.trim().to_string(),
    })?;

    let event = match (&request.datetime, action) {
        (Some(raw), Action::CheckIn | Action::CheckOut) => Some(parse_event_timestamp(raw)?),
        _ => None,
    };

    // Probe (and best-effort widen) before the transaction opens; enum
    // DDL auto-commits and must not sit inside it.
    let allowed = shim::allowed_payment_values(storage).await;

    let mut snapshot = storage.begin_snapshot().await?;
    match run(storage, &mut snapshot, request, action, event.as_ref(), &allowed).await {
        Ok(outcome) => {
            storage.commit_snapshot(snapshot).await?;
            Ok(outcome)
        }
        Err(e) => {
            if let Err(abort_err) = storage.abort_snapshot(snapshot).await {
                eprintln!("Warning: rollback failed: {abort_err}");
            }
            Err(e)
        }
    }
}

async fn run<S: BookingStorage>(
    storage: &S,
    snapshot: &mut S::Snapshot,
    request: &TransitionRequest,
    action: Action,
    event: Option<&EventTime>,
    allowed: &[String],
) -> Result<TransitionOutcome, EngineError> {
    let booking = match storage
        .get_booking_for_update(snapshot, &request.booking_id)
        .await
    {
        Ok(booking) => booking,
        Err(StorageError::BookingNotFound { booking_id }) => {
            return Err(EngineError::NotFound { booking_id })
        }
        Err(e) => return Err(e.into()),
    };

    let t = transition(action);
    let (logical_payment, stored_payment, payment_write) = match t.payment {
        PaymentEffect::Set(target) => {
            let stored = shim::storage_label(target.as_str(), allowed);
            (target.as_str().to_string(), stored.clone(), Some(stored))
        }
        // Cancel carries the stored label forward untouched, legacy
        // aliases included; no payment write at all.
        PaymentEffect::Unchanged => (
            booking.payment_status.clone(),
            booking.payment_status.clone(),
            None,
        ),
    };

    let mut update = BookingUpdate {
        status: Some(t.status.as_str().to_string()),
        payment_status: payment_write,
        ..Default::default()
    };

    // Actual-event sub-writes are skipped, not failed, when the schema
    // lacks the column.
    let mut check_in_time = booking.check_in_time.clone();
    let mut check_out_time = booking.check_out_time.clone();
    if let Some(event) = event {
        match action {
            Action::CheckIn => {
                if storage.has_booking_column("check_in_time").await? {
                    update.check_in_time = Some(event.timestamp.clone());
                    check_in_time = Some(event.timestamp.clone());
                }
            }
            Action::CheckOut => {
                if storage.has_booking_column("check_out_time").await? {
                    update.check_out_time = Some(event.timestamp.clone());
                    check_out_time = Some(event.timestamp.clone());
                }
                // Date-only rewrite of the planned check-out.
                if storage.has_booking_column("check_out").await? {
                    update.check_out = Some(event.date.clone());
                }
            }
            Action::Paid | Action::Cancel => {}
        }
    }

    storage
        .update_booking(snapshot, &request.booking_id, update)
        .await?;

    let entry = audit::build_entry(
        storage,
        &booking,
        t.status,
        &stored_payment,
        action,
        check_in_time.as_deref(),
        check_out_time.as_deref(),
    )
    .await?;
    let log_id = storage.append_log(snapshot, entry).await?;

    Ok(TransitionOutcome {
        status: t.status,
        payment_status: logical_payment,
        stored_payment_status: stored_payment,
        log_id,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use frontdesk_storage::{BookingRecord, MemoryStorage, SchemaProfile};
    use rust_decimal::Decimal;

    use super::*;

    fn booking(id: &str) -> BookingRecord {
        BookingRecord {
            booking_id: id.to_string(),
            user_id: "u-1".to_string(),
            guest_name: "John\n Smith".to_string(),
            email: "john@example.com".to_string(),
            room_number: Some("108".to_string()),
            room_type: Some("Standard".to_string()),
            status: "Confirmed".to_string(),
            payment_status: "Pending".to_string(),
            check_in: "2024-03-01".to_string(),
            check_out: "2024-03-04".to_string(),
            check_in_time: None,
            check_out_time: None,
            total_price: Decimal::new(36000, 2),
            adults: 2,
            children: 1,
            created_at: "2024-02-20T09:00:00Z".to_string(),
        }
    }

    async fn seed(storage: &MemoryStorage, record: BookingRecord) {
        let mut snap = storage.begin_snapshot().await.unwrap();
        storage.create_booking(&mut snap, record).await.unwrap();
        storage.commit_snapshot(snap).await.unwrap();
    }

    fn request(booking_id: &str, action: &str, datetime: Option<&str>) -> TransitionRequest {
        TransitionRequest {
            booking_id: booking_id.to_string(),
            action: action.to_string(),
            datetime: datetime.map(|d| d.to_string()),
        }
    }

    #[tokio::test]
    async fn paid_moves_pending_to_partial_payment() {
        let storage = MemoryStorage::new();
        seed(&storage, booking("b-1")).await;

        let outcome = apply_transition(&storage, &request("b-1", "paid", None))
            .await
            .unwrap();
        assert_eq!(outcome.status, BookingStatus::Confirmed);
        assert_eq!(outcome.payment_status, "Partial Payment");
        assert_eq!(outcome.stored_payment_status, "Partial Payment");

        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(record.status, "Confirmed");
        assert_eq!(record.payment_status, "Partial Payment");

        let logs = storage.list_logs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].last_action, "Paid");
        assert_eq!(logs[0].payment_status, "Partial Payment");
        assert_eq!(logs[0].guest_name, "John Smith");
    }

    #[tokio::test]
    async fn checkin_sets_event_timestamp_when_column_exists() {
        let storage = MemoryStorage::new();
        let mut record = booking("b-1");
        record.payment_status = "Partial Payment".to_string();
        seed(&storage, record).await;

        let outcome = apply_transition(
            &storage,
            &request("b-1", "checkin", Some("2024-03-01T14:00:00")),
        )
        .await
        .unwrap();
        assert_eq!(outcome.status, BookingStatus::CheckedIn);
        assert_eq!(outcome.payment_status, "Partial Payment");

        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(record.status, "Checked-in");
        assert_eq!(record.check_in_time.as_deref(), Some("2024-03-01T14:00:00"));

        let logs = storage.list_logs().await.unwrap();
        assert_eq!(logs[0].check_in, "2024-03-01T14:00:00");
    }

    #[tokio::test]
    async fn checkout_completes_payment_and_rewrites_date() {
        let storage = MemoryStorage::new();
        let mut record = booking("b-1");
        record.status = "Checked-in".to_string();
        record.payment_status = "Partial Payment".to_string();
        seed(&storage, record).await;

        let outcome = apply_transition(
            &storage,
            &request("b-1", "checkout", Some("2024-03-05T11:00:00")),
        )
        .await
        .unwrap();
        assert_eq!(outcome.status, BookingStatus::CheckedOut);
        assert_eq!(outcome.payment_status, "Payment Complete");

        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(record.status, "Checked-out");
        assert_eq!(record.payment_status, "Payment Complete");
        assert_eq!(record.check_out_time.as_deref(), Some("2024-03-05T11:00:00"));
        assert_eq!(record.check_out, "2024-03-05");
    }

    #[tokio::test]
    async fn checkin_skips_timestamp_on_legacy_schema() {
        let storage = MemoryStorage::with_profile(SchemaProfile::legacy());
        seed(&storage, booking("b-1")).await;

        apply_transition(
            &storage,
            &request("b-1", "checkin", Some("2024-03-01T14:00:00")),
        )
        .await
        .unwrap();

        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(record.status, "Checked-in");
        assert_eq!(record.check_in_time, None);
    }

    #[tokio::test]
    async fn cancel_preserves_payment_status_including_legacy_labels() {
        let storage = MemoryStorage::new();
        let mut record = booking("b-1");
        // Legacy label left over from before the enum migration.
        record.payment_status = "Paid".to_string();
        seed(&storage, record).await;

        let outcome = apply_transition(&storage, &request("b-1", "cancel", None))
            .await
            .unwrap();
        assert_eq!(outcome.status, BookingStatus::Cancelled);
        assert_eq!(outcome.payment_status, "Paid");
        assert_eq!(outcome.stored_payment_status, "Paid");

        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(record.status, "Cancelled");
        assert_eq!(record.payment_status, "Paid");

        let logs = storage.list_logs().await.unwrap();
        assert_eq!(logs[0].payment_status, "Paid");
        assert_eq!(logs[0].last_action, "Cancel");
    }

    #[tokio::test]
    async fn legacy_schema_stores_and_logs_the_legacy_label() {
        let storage = MemoryStorage::with_profile(SchemaProfile::legacy());
        seed(&storage, booking("b-1")).await;

        let outcome = apply_transition(&storage, &request("b-1", "paid", None))
            .await
            .unwrap();
        // Clients still see the logical label; storage and log hold Paid.
        assert_eq!(outcome.payment_status, "Partial Payment");
        assert_eq!(outcome.stored_payment_status, "Paid");

        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(record.payment_status, "Paid");
        let logs = storage.list_logs().await.unwrap();
        assert_eq!(logs[0].payment_status, "Paid");
    }

    #[tokio::test]
    async fn unknown_action_rejected_without_any_mutation() {
        let storage = MemoryStorage::new();
        seed(&storage, booking("b-1")).await;

        let err = apply_transition(&storage, &request("b-1", "refund", None))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction { .. }));

        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(record.status, "Confirmed");
        assert_eq!(record.payment_status, "Pending");
        assert!(storage.list_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_booking_rejected_without_log_row() {
        let storage = MemoryStorage::new();
        let err = apply_transition(&storage, &request("ghost", "paid", None))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
        assert!(storage.list_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_datetime_rejected_before_any_write() {
        let storage = MemoryStorage::new();
        seed(&storage, booking("b-1")).await;

        let err = apply_transition(&storage, &request("b-1", "checkin", Some("next tuesday")))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimestamp { .. }));
        assert!(storage.list_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn datetime_ignored_for_paid_and_cancel() {
        let storage = MemoryStorage::new();
        seed(&storage, booking("b-1")).await;

        // Would be a parse error if it were honored.
        let outcome = apply_transition(&storage, &request("b-1", "paid", Some("garbage")))
            .await
            .unwrap();
        assert_eq!(outcome.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn action_verbs_normalize_case_and_whitespace() {
        let storage = MemoryStorage::new();
        seed(&storage, booking("b-1")).await;

        let outcome = apply_transition(&storage, &request("b-1", "  PAID ", None))
            .await
            .unwrap();
        assert_eq!(outcome.payment_status, "Partial Payment");
    }

    #[tokio::test]
    async fn each_transition_appends_exactly_one_log_row() {
        let storage = MemoryStorage::new();
        seed(&storage, booking("b-1")).await;

        for action in ["paid", "checkin", "checkout", "cancel"] {
            apply_transition(&storage, &request("b-1", action, None))
                .await
                .unwrap();
        }
        let logs = storage.list_logs().await.unwrap();
        assert_eq!(logs.len(), 4);
        let actions: Vec<&str> = logs.iter().map(|l| l.last_action.as_str()).collect();
        assert_eq!(actions, ["Paid", "Check-in", "Check-out", "Cancel"]);
    }

    #[tokio::test]
    async fn stored_label_round_trips_to_canonical_value() {
        let storage = MemoryStorage::with_profile(SchemaProfile::legacy());
        seed(&storage, booking("b-1")).await;

        apply_transition(&storage, &request("b-1", "checkout", None))
            .await
            .unwrap();
        let record = storage.get_booking("b-1").await.unwrap();
        assert_eq!(
            frontdesk_core::PaymentStatus::normalize(&record.payment_status),
            Some(frontdesk_core::PaymentStatus::PaymentComplete)
        );
    }

    #[tokio::test]
    async fn concurrent_transitions_on_one_booking_serialize() {
        let storage = Arc::new(MemoryStorage::new());
        seed(&storage, booking("b-1")).await;

        let mut handles = Vec::new();
        for action in ["paid", "checkin", "checkout", "cancel"] {
            let s = storage.clone();
            handles.push(tokio::spawn(async move {
                apply_transition(&*s, &request("b-1", action, None)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let logs = storage.list_logs().await.unwrap();
        assert_eq!(logs.len(), 4);
        // Serialized appends: per-booking timestamps never go backwards.
        for pair in logs.windows(2) {
            assert!(pair[0].action_timestamp <= pair[1].action_timestamp);
            assert!(pair[0].log_id < pair[1].log_id);
        }
    }
}
