use std::future::Future;

use super::{make_booking, make_log_entry, seed_booking, TestResult};
use crate::record::BookingUpdate;
use crate::schema::SchemaProfile;
use crate::{BookingStorage, StorageError};

pub(super) async fn run_commit_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "commit",
        "created_booking_visible_after_commit",
        created_booking_visible_after_commit(factory).await,
    ));
    results.push(TestResult::from_result(
        "commit",
        "duplicate_create_rejected",
        duplicate_create_rejected(factory).await,
    ));
    results.push(TestResult::from_result(
        "commit",
        "update_and_log_both_visible_after_commit",
        update_and_log_both_visible_after_commit(factory).await,
    ));
    results.push(TestResult::from_result(
        "commit",
        "update_and_log_neither_visible_after_abort",
        update_and_log_neither_visible_after_abort(factory).await,
    ));
    results.push(TestResult::from_result(
        "commit",
        "update_merges_only_provided_fields",
        update_merges_only_provided_fields(factory).await,
    ));
    results.push(TestResult::from_result(
        "commit",
        "update_of_missing_booking_is_not_found",
        update_of_missing_booking_is_not_found(factory).await,
    ));
    results.push(TestResult::from_result(
        "commit",
        "log_fields_preserved_through_commit",
        log_fields_preserved_through_commit(factory).await,
    ));

    results
}

async fn created_booking_visible_after_commit<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;
    let record = storage
        .get_booking("b-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if record.status != "Confirmed" || record.payment_status != "Pending" {
        return Err(format!(
            "unexpected seed state: {}/{}",
            record.status, record.payment_status
        ));
    }
    Ok(())
}

async fn duplicate_create_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;
    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    match storage.create_booking(&mut snap, make_booking("b-1")).await {
        Err(StorageError::AlreadyExists { .. }) => {
            storage
                .abort_snapshot(snap)
                .await
                .map_err(|e| format!("abort: {e}"))?;
            Ok(())
        }
        Err(e) => Err(format!("expected AlreadyExists, got: {e}")),
        Ok(()) => Err("duplicate create accepted".to_string()),
    }
}

async fn update_and_log_both_visible_after_commit<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;

    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    storage
        .get_booking_for_update(&mut snap, "b-1")
        .await
        .map_err(|e| format!("lock: {e}"))?;
    storage
        .update_booking(
            &mut snap,
            "b-1",
            BookingUpdate {
                status: Some("Checked-in".to_string()),
                payment_status: Some("Partial Payment".to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| format!("update: {e}"))?;
    storage
        .append_log(&mut snap, make_log_entry("b-1", "Check-in"))
        .await
        .map_err(|e| format!("append: {e}"))?;
    storage
        .commit_snapshot(snap)
        .await
        .map_err(|e| format!("commit: {e}"))?;

    let record = storage
        .get_booking("b-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if record.status != "Checked-in" {
        return Err(format!("status not updated: {}", record.status));
    }
    let logs = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;
    if logs.len() != 1 {
        return Err(format!("expected 1 log row, got {}", logs.len()));
    }
    Ok(())
}

async fn update_and_log_neither_visible_after_abort<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;

    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    storage
        .get_booking_for_update(&mut snap, "b-1")
        .await
        .map_err(|e| format!("lock: {e}"))?;
    storage
        .update_booking(
            &mut snap,
            "b-1",
            BookingUpdate {
                status: Some("Cancelled".to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| format!("update: {e}"))?;
    storage
        .append_log(&mut snap, make_log_entry("b-1", "Cancel"))
        .await
        .map_err(|e| format!("append: {e}"))?;
    storage
        .abort_snapshot(snap)
        .await
        .map_err(|e| format!("abort: {e}"))?;

    let record = storage
        .get_booking("b-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if record.status != "Confirmed" {
        return Err(format!("aborted update leaked: {}", record.status));
    }
    let logs = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;
    if !logs.is_empty() {
        return Err(format!("aborted log leaked: {} rows", logs.len()));
    }
    Ok(())
}

async fn update_merges_only_provided_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;

    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    storage
        .get_booking_for_update(&mut snap, "b-1")
        .await
        .map_err(|e| format!("lock: {e}"))?;
    storage
        .update_booking(
            &mut snap,
            "b-1",
            BookingUpdate {
                check_in_time: Some("2025-01-10T14:00:00".to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| format!("update: {e}"))?;
    storage
        .commit_snapshot(snap)
        .await
        .map_err(|e| format!("commit: {e}"))?;

    let record = storage
        .get_booking("b-1")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if record.check_in_time.as_deref() != Some("2025-01-10T14:00:00") {
        return Err(format!("check_in_time not set: {:?}", record.check_in_time));
    }
    if record.status != "Confirmed" || record.payment_status != "Pending" {
        return Err("untouched fields were modified".to_string());
    }
    if record.check_out != "2025-01-12" {
        return Err(format!("check_out changed: {}", record.check_out));
    }
    Ok(())
}

async fn update_of_missing_booking_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    let result = storage
        .update_booking(
            &mut snap,
            "missing",
            BookingUpdate {
                status: Some("Cancelled".to_string()),
                ..Default::default()
            },
        )
        .await;
    storage
        .abort_snapshot(snap)
        .await
        .map_err(|e| format!("abort: {e}"))?;
    match result {
        Err(StorageError::BookingNotFound { .. }) => Ok(()),
        Err(e) => Err(format!("expected BookingNotFound, got: {e}")),
        Ok(()) => Err("update of missing booking accepted".to_string()),
    }
}

async fn log_fields_preserved_through_commit<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;

    let mut entry = make_log_entry("b-1", "Check-out");
    entry.email = Some("guest@example.com".to_string());
    entry.room_number = Some("101".to_string());
    entry.payment_status = "Payment Complete".to_string();
    entry.status = "Checked-out".to_string();

    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    let log_id = storage
        .append_log(&mut snap, entry)
        .await
        .map_err(|e| format!("append: {e}"))?;
    storage
        .commit_snapshot(snap)
        .await
        .map_err(|e| format!("commit: {e}"))?;

    let logs = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;
    let row = logs
        .iter()
        .find(|l| l.log_id == log_id)
        .ok_or("appended row missing")?;
    if row.last_action != "Check-out"
        || row.payment_status != "Payment Complete"
        || row.email.as_deref() != Some("guest@example.com")
        || row.room_number.as_deref() != Some("101")
        || row.performed_by != "Admin"
    {
        return Err(format!("log fields mangled: {row:?}"));
    }
    Ok(())
}
