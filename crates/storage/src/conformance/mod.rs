//! Conformance test suite for `BookingStorage` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `BookingStorage` implementation can run to verify correctness. The
//! suite covers:
//!
//! - **Atomic commit**: booking update + log append both-or-neither
//! - **Locking**: same-booking serialization, cross-booking parallelism
//! - **Log semantics**: append-only, monotonic ids, insertion order
//! - **Schema capabilities**: value/column reporting, best-effort widening
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function
//! that creates a fresh, empty storage instance for each test, honoring
//! the requested [`SchemaProfile`]:
//!
//! ```ignore
//! use frontdesk_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn mysql_conformance() {
//!     let report = run_conformance_suite(|profile| async move {
//!         create_test_mysql_storage(profile).await
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod commit;
mod locking;
mod log;
mod schema;

use std::fmt;
use std::future::Future;

use rust_decimal::Decimal;

use crate::record::{BookingRecord, NewLogEntry};
use crate::schema::SchemaProfile;
use crate::BookingStorage;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "commit", "locking").
    pub category: String,
    /// Test name (e.g. "update_and_log_neither_visible_after_abort").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                category: category.to_string(),
                name: name.to_string(),
                passed: true,
                message: None,
            },
            Err(msg) => Self {
                category: category.to_string(),
                name: name.to_string(),
                passed: false,
                message: Some(msg),
            },
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// storage instance with the requested schema profile, ensuring test
/// isolation.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(commit::run_commit_tests(&factory).await);
    results.extend(locking::run_locking_tests(&factory).await);
    results.extend(log::run_log_tests(&factory).await);
    results.extend(schema::run_schema_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers: record constructors with sensible defaults ──────────────────────

/// A booking fixture valid under every schema profile.
fn make_booking(booking_id: &str) -> BookingRecord {
    BookingRecord {
        booking_id: booking_id.to_string(),
        user_id: "user-1".to_string(),
        guest_name: "Conformance Guest".to_string(),
        email: "guest@example.com".to_string(),
        room_number: Some("101".to_string()),
        room_type: Some("Standard".to_string()),
        status: "Confirmed".to_string(),
        payment_status: "Pending".to_string(),
        check_in: "2025-01-10".to_string(),
        check_out: "2025-01-12".to_string(),
        check_in_time: None,
        check_out_time: None,
        total_price: Decimal::new(19900, 2),
        adults: 2,
        children: 1,
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

/// A log entry fixture valid under every schema profile: no optional
/// columns, payment label accepted by both value sets.
fn make_log_entry(booking_id: &str, last_action: &str) -> NewLogEntry {
    NewLogEntry {
        booking_id: booking_id.to_string(),
        guest_name: "Conformance Guest".to_string(),
        email: None,
        room_number: None,
        payment_status: "Pending".to_string(),
        status: "Confirmed".to_string(),
        room: "Room 101".to_string(),
        check_in: "2025-01-10".to_string(),
        check_out: "2025-01-12".to_string(),
        last_action: last_action.to_string(),
        action_timestamp: "2025-01-11T08:00:00Z".to_string(),
        performed_by: "Admin".to_string(),
    }
}

/// Seed one committed booking through the snapshot API.
async fn seed_booking<S: BookingStorage>(storage: &S, booking_id: &str) -> Result<(), String> {
    let mut snap = storage
        .begin_snapshot()
        .await
        .map_err(|e| format!("begin: {e}"))?;
    storage
        .create_booking(&mut snap, make_booking(booking_id))
        .await
        .map_err(|e| format!("create: {e}"))?;
    storage
        .commit_snapshot(snap)
        .await
        .map_err(|e| format!("commit seed: {e}"))?;
    Ok(())
}
