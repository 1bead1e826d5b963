use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{make_log_entry, seed_booking, TestResult};
use crate::record::BookingUpdate;
use crate::schema::SchemaProfile;
use crate::BookingStorage;

/// Number of racing tasks in the serialization test.
const N: usize = 8;

/// Upper bound for tests that would deadlock on a faulty backend.
const LOCK_TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) async fn run_locking_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "locking",
        "same_booking_transitions_serialize",
        same_booking_transitions_serialize(factory).await,
    ));
    results.push(TestResult::from_result(
        "locking",
        "blocked_reader_sees_committed_state",
        blocked_reader_sees_committed_state(factory).await,
    ));
    results.push(TestResult::from_result(
        "locking",
        "different_bookings_do_not_block_each_other",
        different_bookings_do_not_block_each_other(factory).await,
    ));

    results
}

// ── Same-booking serialization ──────────────────────────────────────────────

/// N racing tasks each lock the same booking, log the state they observed,
/// and advance a counter encoded in the status field. Under correct
/// FOR-UPDATE semantics no two tasks observe the same prior state and no
/// update is lost.
async fn same_booking_transitions_serialize<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory(SchemaProfile::migrated()).await);
    seed_booking(&*storage, "b-race").await?;

    // Encode a counter in the status column: S0, S1, ...
    {
        let mut snap = storage
            .begin_snapshot()
            .await
            .map_err(|e| format!("begin: {e}"))?;
        storage
            .get_booking_for_update(&mut snap, "b-race")
            .await
            .map_err(|e| format!("lock: {e}"))?;
        storage
            .update_booking(
                &mut snap,
                "b-race",
                BookingUpdate {
                    status: Some("S0".to_string()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| format!("init update: {e}"))?;
        storage
            .commit_snapshot(snap)
            .await
            .map_err(|e| format!("init commit: {e}"))?;
    }

    let mut handles = Vec::new();
    for _ in 0..N {
        let s = storage.clone();
        handles.push(tokio::spawn(async move {
            let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
            let record = s
                .get_booking_for_update(&mut snap, "b-race")
                .await
                .map_err(|e| e.to_string())?;
            let n: usize = record
                .status
                .strip_prefix('S')
                .and_then(|v| v.parse().ok())
                .ok_or_else(|| format!("unparseable counter: {}", record.status))?;
            let mut entry = make_log_entry("b-race", "Bump");
            entry.status = record.status.clone();
            s.append_log(&mut snap, entry)
                .await
                .map_err(|e| e.to_string())?;
            s.update_booking(
                &mut snap,
                "b-race",
                BookingUpdate {
                    status: Some(format!("S{}", n + 1)),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| e.to_string())?;
            s.commit_snapshot(snap).await.map_err(|e| e.to_string())?;
            Ok::<(), String>(())
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| format!("join: {e}"))?
            .map_err(|e| format!("task: {e}"))?;
    }

    let record = storage
        .get_booking("b-race")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if record.status != format!("S{N}") {
        return Err(format!("lost update: final state {}", record.status));
    }

    // Every task must have observed a distinct prior state: S0..S{N-1}.
    let logs = storage.list_logs().await.map_err(|e| format!("logs: {e}"))?;
    let mut observed: Vec<&str> = logs.iter().map(|l| l.status.as_str()).collect();
    observed.sort_unstable();
    observed.dedup();
    if observed.len() != N {
        return Err(format!(
            "two transitions observed the same prior state: {observed:?}"
        ));
    }
    Ok(())
}

// ── Blocked reader observes committed state ─────────────────────────────────

async fn blocked_reader_sees_committed_state<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory(SchemaProfile::migrated()).await);
    seed_booking(&*storage, "b-1").await?;

    let (locked_tx, locked_rx) = tokio::sync::oneshot::channel::<()>();

    let writer = {
        let s = storage.clone();
        tokio::spawn(async move {
            let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
            s.get_booking_for_update(&mut snap, "b-1")
                .await
                .map_err(|e| e.to_string())?;
            let _ = locked_tx.send(());
            s.update_booking(
                &mut snap,
                "b-1",
                BookingUpdate {
                    status: Some("Checked-in".to_string()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| e.to_string())?;
            // Hold the lock long enough for the reader to block on it.
            tokio::time::sleep(Duration::from_millis(100)).await;
            s.commit_snapshot(snap).await.map_err(|e| e.to_string())?;
            Ok::<(), String>(())
        })
    };

    locked_rx.await.map_err(|_| "writer died before locking")?;

    let reader = {
        let s = storage.clone();
        tokio::spawn(async move {
            let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
            let record = s
                .get_booking_for_update(&mut snap, "b-1")
                .await
                .map_err(|e| e.to_string())?;
            s.abort_snapshot(snap).await.map_err(|e| e.to_string())?;
            Ok::<String, String>(record.status)
        })
    };

    let observed = tokio::time::timeout(LOCK_TEST_TIMEOUT, reader)
        .await
        .map_err(|_| "reader deadlocked")?
        .map_err(|e| format!("join: {e}"))?
        .map_err(|e| format!("reader: {e}"))?;
    writer
        .await
        .map_err(|e| format!("join: {e}"))?
        .map_err(|e| format!("writer: {e}"))?;

    if observed != "Checked-in" {
        return Err(format!(
            "reader observed stale prior state: {observed} (expected Checked-in)"
        ));
    }
    Ok(())
}

// ── Cross-booking parallelism ───────────────────────────────────────────────

/// A transaction holding booking A's lock must not block one on booking B.
async fn different_bookings_do_not_block_each_other<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = Arc::new(factory(SchemaProfile::migrated()).await);
    seed_booking(&*storage, "b-1").await?;
    seed_booking(&*storage, "b-2").await?;

    // Hold b-1's lock for the duration of the b-2 transaction.
    let mut holder = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    storage
        .get_booking_for_update(&mut holder, "b-1")
        .await
        .map_err(|e| format!("lock b-1: {e}"))?;

    let other = {
        let s = storage.clone();
        tokio::spawn(async move {
            let mut snap = s.begin_snapshot().await.map_err(|e| e.to_string())?;
            s.get_booking_for_update(&mut snap, "b-2")
                .await
                .map_err(|e| e.to_string())?;
            s.update_booking(
                &mut snap,
                "b-2",
                BookingUpdate {
                    status: Some("Cancelled".to_string()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| e.to_string())?;
            s.commit_snapshot(snap).await.map_err(|e| e.to_string())?;
            Ok::<(), String>(())
        })
    };

    tokio::time::timeout(LOCK_TEST_TIMEOUT, other)
        .await
        .map_err(|_| "cross-booking transaction blocked")?
        .map_err(|e| format!("join: {e}"))?
        .map_err(|e| format!("task: {e}"))?;

    storage
        .abort_snapshot(holder)
        .await
        .map_err(|e| format!("abort holder: {e}"))?;

    let record = storage
        .get_booking("b-2")
        .await
        .map_err(|e| format!("get: {e}"))?;
    if record.status != "Cancelled" {
        return Err(format!("b-2 update lost: {}", record.status));
    }
    Ok(())
}
