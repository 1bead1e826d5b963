//! HTTP route handlers: health, bookings, transitions, logs, CSV export.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use frontdesk_engine::query::{filter_value, LogFilter, LogSort, SortDir, SortField};
use frontdesk_engine::{apply_transition, export, query, EngineError, TransitionRequest};
use frontdesk_storage::{BookingStorage, StorageError};
use serde::Deserialize;
use time::macros::format_description;
use time::OffsetDateTime;

use super::state::AppState;
use super::json_error;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": frontdesk_core::FRONTDESK_VERSION,
    });
    (StatusCode::OK, Json(response))
}

/// GET /bookings
pub(crate) async fn handle_list_bookings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.storage.list_bookings().await {
        Ok(bookings) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": bookings})),
        )
            .into_response(),
        Err(e) => storage_error(&e),
    }
}

/// GET /bookings/{booking_id}
pub(crate) async fn handle_get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> impl IntoResponse {
    match state.storage.get_booking(&booking_id).await {
        Ok(booking) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": booking})),
        )
            .into_response(),
        Err(StorageError::BookingNotFound { booking_id }) => json_error(
            StatusCode::BAD_REQUEST,
            &format!("booking not found: {}", booking_id),
        )
        .into_response(),
        Err(e) => storage_error(&e),
    }
}

/// POST /bookings/{booking_id}/transition request body.
#[derive(Deserialize)]
pub(crate) struct TransitionBody {
    action: Option<String>,
    datetime: Option<String>,
}

/// POST /bookings/{booking_id}/transition
pub(crate) async fn handle_transition(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> impl IntoResponse {
    let request = TransitionRequest {
        booking_id,
        action: body.action.unwrap_or_default(),
        datetime: body.datetime,
    };

    match apply_transition(&state.storage, &request).await {
        Ok(outcome) => {
            let response = serde_json::json!({
                "success": true,
                "message": "Booking status updated successfully.",
                "status": outcome.status.as_str(),
                "payment_status": outcome.payment_status,
            });
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) if e.is_validation() => {
            json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response()
        }
        Err(EngineError::Storage(e)) => storage_error(&e),
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response(),
    }
}

fn storage_error(e: &StorageError) -> axum::response::Response {
    let body = serde_json::json!({
        "success": false,
        "message": "Update failed",
        "error": e.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Query parameters shared by /logs and /logs/export.csv.
#[derive(Deserialize, Default)]
pub(crate) struct LogsQuery {
    search: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
    room_type: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
    page: Option<String>,
}

impl LogsQuery {
    fn filter(&self) -> LogFilter {
        LogFilter {
            search: filter_value(self.search.clone()),
            status: filter_value(self.status.clone()),
            payment_status: filter_value(self.payment_status.clone()),
            room_type: filter_value(self.room_type.clone()),
            date_from: filter_value(self.date_from.clone()),
            date_to: filter_value(self.date_to.clone()),
        }
    }

    /// Unknown sort fields and directions fall back to the default order
    /// rather than erroring.
    fn sort(&self) -> LogSort {
        let default = LogSort::default();
        let field = self
            .sort
            .as_deref()
            .and_then(SortField::parse)
            .unwrap_or(default.field);
        let dir = self
            .dir
            .as_deref()
            .and_then(SortDir::parse)
            .unwrap_or(if field == default.field {
                default.dir
            } else {
                SortDir::Asc
            });
        LogSort { field, dir }
    }

    fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1)
    }
}

/// GET /logs
pub(crate) async fn handle_list_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogsQuery>,
) -> impl IntoResponse {
    let rows = match state.storage.list_logs().await {
        Ok(rows) => rows,
        Err(e) => return storage_error(&e),
    };
    let rows = query::filter_and_sort(rows, &params.filter(), params.sort());
    let page = query::paginate(rows, params.page());

    let response = serde_json::json!({
        "success": true,
        "data": page.rows,
        "page": page.page,
        "page_size": page.page_size,
        "total": page.total,
        "total_pages": page.total_pages,
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /logs/export.csv -- same filters as /logs, unpaginated.
pub(crate) async fn handle_export_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogsQuery>,
) -> impl IntoResponse {
    let rows = match state.storage.list_logs().await {
        Ok(rows) => rows,
        Err(e) => return storage_error(&e),
    };
    let rows = query::filter_and_sort(rows, &params.filter(), params.sort());
    let csv = export::export_csv(&rows);

    let stamp = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".to_string());
    let disposition = format!("attachment; filename=\"booking_logs_{}.csv\"", stamp);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response()
}
