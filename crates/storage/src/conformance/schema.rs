use std::future::Future;

use super::TestResult;
use crate::schema::SchemaProfile;
use crate::BookingStorage;

pub(super) async fn run_schema_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::from_result(
        "schema",
        "migrated_profile_reports_canonical_values",
        migrated_profile_reports_canonical_values(factory).await,
    ));
    results.push(TestResult::from_result(
        "schema",
        "legacy_profile_reports_legacy_values",
        legacy_profile_reports_legacy_values(factory).await,
    ));
    results.push(TestResult::from_result(
        "schema",
        "column_probes_reflect_profile",
        column_probes_reflect_profile(factory).await,
    ));
    results.push(TestResult::from_result(
        "schema",
        "widen_fails_without_ddl_rights",
        widen_fails_without_ddl_rights(factory).await,
    ));
    results.push(TestResult::from_result(
        "schema",
        "widen_succeeds_with_ddl_rights",
        widen_succeeds_with_ddl_rights(factory).await,
    ));

    results
}

async fn migrated_profile_reports_canonical_values<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::migrated()).await;
    let values = storage
        .payment_status_values()
        .await
        .map_err(|e| format!("probe: {e}"))?;
    for expected in ["Pending", "Partial Payment", "Payment Complete"] {
        if !values.iter().any(|v| v == expected) {
            return Err(format!("missing canonical value {expected}: {values:?}"));
        }
    }
    Ok(())
}

async fn legacy_profile_reports_legacy_values<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::legacy()).await;
    let values = storage
        .payment_status_values()
        .await
        .map_err(|e| format!("probe: {e}"))?;
    if values.iter().any(|v| v == "Partial Payment") {
        return Err(format!("legacy profile reports canonical value: {values:?}"));
    }
    for expected in ["Pending", "Paid", "Completed"] {
        if !values.iter().any(|v| v == expected) {
            return Err(format!("missing legacy value {expected}: {values:?}"));
        }
    }
    Ok(())
}

async fn column_probes_reflect_profile<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let migrated = factory(SchemaProfile::migrated()).await;
    for column in ["check_in_time", "check_out_time"] {
        if !migrated
            .has_booking_column(column)
            .await
            .map_err(|e| format!("probe: {e}"))?
        {
            return Err(format!("migrated schema missing {column}"));
        }
    }
    for column in ["email", "room_number"] {
        if !migrated
            .has_log_column(column)
            .await
            .map_err(|e| format!("probe: {e}"))?
        {
            return Err(format!("migrated log schema missing {column}"));
        }
    }

    let legacy = factory(SchemaProfile::legacy()).await;
    for column in ["check_in_time", "check_out_time"] {
        if legacy
            .has_booking_column(column)
            .await
            .map_err(|e| format!("probe: {e}"))?
        {
            return Err(format!("legacy schema claims {column}"));
        }
    }
    for column in ["email", "room_number"] {
        if legacy
            .has_log_column(column)
            .await
            .map_err(|e| format!("probe: {e}"))?
        {
            return Err(format!("legacy log schema claims {column}"));
        }
    }
    // Core columns are present everywhere.
    if !legacy
        .has_booking_column("payment_status")
        .await
        .map_err(|e| format!("probe: {e}"))?
    {
        return Err("legacy schema missing payment_status".to_string());
    }
    Ok(())
}

async fn widen_fails_without_ddl_rights<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::legacy()).await;
    if storage.widen_payment_status_values().await.is_ok() {
        return Err("widen succeeded without DDL rights".to_string());
    }
    // A failed widen must leave the value set untouched.
    let values = storage
        .payment_status_values()
        .await
        .map_err(|e| format!("probe: {e}"))?;
    if !values.iter().any(|v| v == "Paid") {
        return Err(format!("failed widen mutated values: {values:?}"));
    }
    Ok(())
}

async fn widen_succeeds_with_ddl_rights<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: BookingStorage,
    F: Fn(SchemaProfile) -> Fut,
    Fut: Future<Output = S>,
{
    let storage = factory(SchemaProfile::legacy_widenable()).await;
    storage
        .widen_payment_status_values()
        .await
        .map_err(|e| format!("widen: {e}"))?;
    let values = storage
        .payment_status_values()
        .await
        .map_err(|e| format!("probe: {e}"))?;
    for expected in ["Pending", "Partial Payment", "Payment Complete"] {
        if !values.iter().any(|v| v == expected) {
            return Err(format!("widen incomplete: {values:?}"));
        }
    }
    Ok(())
}
