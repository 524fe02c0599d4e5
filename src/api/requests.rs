//! Borrow request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        history::HistoryEntry,
        request::{BorrowRequest, BorrowRequestDetails},
    },
};

use super::CurrentUser;

/// Submit borrow request payload
#[derive(Deserialize, ToSchema)]
pub struct SubmitRequestPayload {
    /// Book to borrow
    pub book_id: i32,
    /// First borrowed day (inclusive)
    pub start_date: NaiveDate,
    /// Last borrowed day (inclusive)
    pub end_date: NaiveDate,
}

/// Admin decision payload
#[derive(Deserialize, ToSchema)]
pub struct DecisionPayload {
    /// "approve" or "deny"
    pub action: String,
}

/// Record return payload
#[derive(Deserialize, ToSchema)]
pub struct ReturnPayload {
    /// Day the book came back; defaults to today
    pub returned_date: Option<NaiveDate>,
}

/// Submit a borrow request for a date range
#[utoipa::path(
    post,
    path = "/requests",
    tag = "requests",
    request_body = SubmitRequestPayload,
    responses(
        (status = 201, description = "Request created pending approval", body = BorrowRequest),
        (status = 400, description = "Start date after end date"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book already requested or borrowed in this period")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    Json(payload): Json<SubmitRequestPayload>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let request = state
        .services
        .borrowing
        .submit_request(user.id, payload.book_id, payload.start_date, payload.end_date)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List all borrow requests (admin)
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    responses(
        (status = 200, description = "All borrow requests", body = Vec<BorrowRequestDetails>),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<BorrowRequestDetails>>> {
    user.require_admin()?;

    let requests = state.services.borrowing.list_requests().await?;
    Ok(Json(requests))
}

/// Approve or deny a pending request (admin)
#[utoipa::path(
    patch,
    path = "/requests/{id}",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Borrow request ID")
    ),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Request decided", body = BorrowRequest),
        (status = 400, description = "Unknown action"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already decided")
    )
)]
pub async fn decide_request(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    Path(request_id): Path<i32>,
    Json(payload): Json<DecisionPayload>,
) -> AppResult<Json<BorrowRequest>> {
    user.require_admin()?;

    let request = state
        .services
        .borrowing
        .decide_request(request_id, &payload.action)
        .await?;

    Ok(Json(request))
}

/// Record the return of an approved request's loan (admin)
#[utoipa::path(
    post,
    path = "/requests/{id}/return",
    tag = "requests",
    params(
        ("id" = i32, Path, description = "Borrow request ID")
    ),
    request_body = ReturnPayload,
    responses(
        (status = 200, description = "Ledger entry closed", body = HistoryEntry),
        (status = 400, description = "Returned date before borrowed date"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Request or ledger entry not found"),
        (status = 409, description = "Not an approved loan, or already returned")
    )
)]
pub async fn record_return(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    Path(request_id): Path<i32>,
    Json(payload): Json<ReturnPayload>,
) -> AppResult<Json<HistoryEntry>> {
    user.require_admin()?;

    let entry = state
        .services
        .borrowing
        .record_return(request_id, payload.returned_date)
        .await?;

    Ok(Json(entry))
}
