use std::future::Future;

use super::{make_log_entry, seed_booking, TestResult};
use crate::schema::SchemaProfile;
use crate::BookingStorage;

pub(super) async fn run_log_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "log",
        "log_ids_monotonic_across_snapshots",
        log_ids_monotonic_across_snapshots(factory).await,
    ));
    results.push(TestResult::from_result(
        "log",
        "aborted_append_leaves_no_row",
        aborted_append_leaves_no_row(factory).await,
    ));
    results.push(TestResult::from_result(
        "log",
        "logs_listed_in_insertion_order",
        logs_listed_in_insertion_order(factory).await,
    ));
    results.push(TestResult::from_result(
        "log",
        "existing_rows_survive_later_appends",
        existing_rows_survive_later_appends(factory).await,
    ));

    results
}

async fn append_committed<S: BookingStorage>(
    storage: &S,
    booking_id: &str,
    last_action: &str,
) -> Result<i64, String> {
    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    let log_id = storage
        .append_log(&mut snap, make_log_entry(booking_id, last_action))
        .await
        .map_err(|e| format!("append: {e}"))?;
    storage
        .commit_snapshot(snap)
        .await
        .map_err(|e| format!("commit: {e}"))?;
    Ok(log_id)
}

async fn log_ids_monotonic_across_snapshots<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;

    let mut last = 0;
    for action in ["Paid", "Check-in", "Check-out"] {
        let id = append_committed(&storage, "b-1", action).await?;
        if id <= last {
            return Err(format!("log ids not monotonic: {id} after {last}"));
        }
        last = id;
    }
    Ok(())
}

async fn aborted_append_leaves_no_row<S, F, Fut>(factory: &F) -> Result<(), String>
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
        .append_log(&mut snap, make_log_entry("b-1", "Paid"))
        .await
        .map_err(|e| format!("append: {e}"))?;
    storage
        .abort_snapshot(snap)
        .await
        .map_err(|e| format!("abort: {e}"))?;

    let logs = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;
    if !logs.is_empty() {
        return Err(format!("aborted append visible: {} rows", logs.len()));
    }

    // A later committed append still succeeds and stays monotonic.
    let id = append_committed(&storage, "b-1", "Paid").await?;
    if id < 1 {
        return Err(format!("bad log id after abort: {id}"));
    }
    Ok(())
}

async fn logs_listed_in_insertion_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;

    for action in ["Paid", "Check-in", "Check-out", "Cancel"] {
        append_committed(&storage, "b-1", action).await?;
    }

    let logs = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;
    let actions: Vec<&str> = logs.iter().map(|l| l.last_action.as_str()).collect();
    if actions != ["Paid", "Check-in", "Check-out", "Cancel"] {
        return Err(format!("out of insertion order: {actions:?}"));
    }
    for pair in logs.windows(2) {
        if pair[1].log_id <= pair[0].log_id {
            return Err(format!(
                "ids not increasing: {} then {}",
                pair[0].log_id, pair[1].log_id
            ));
        }
    }
    Ok(())
}

async fn existing_rows_survive_later_appends<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    seed_booking(&storage, "b-1").await?;

    let first_id = append_committed(&storage, "b-1", "Paid").await?;
    let before = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;

    append_committed(&storage, "b-1", "Check-in").await?;
    let after = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;

    let first_before = before
        .iter()
        .find(|l| l.log_id == first_id)
        .ok_or("first row missing before")?;
    let first_after = after
        .iter()
        .find(|l| l.log_id == first_id)
        .ok_or("first row missing after")?;
    if first_before.last_action != first_after.last_action
        || first_before.action_timestamp != first_after.action_timestamp
    {
        return Err("earlier log row was mutated by a later append".to_string());
    }
    Ok(())
}
