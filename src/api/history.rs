//! Borrow history endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::history::HistoryEntryDetails};

use super::CurrentUser;

/// Get the caller's own borrow history
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    responses(
        (status = 200, description = "Caller's borrow history, oldest loan first", body = Vec<HistoryEntryDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_history(
    State(state): State<crate::AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<HistoryEntryDetails>>> {
    let entries = state.services.borrowing.list_history_for_user(user.id).await?;
    Ok(Json(entries))
}

/// Get any user's borrow history (admin)
#[utoipa::path(
    get,
    path = "/users/{id}/history",
    tag = "history",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's borrow history, oldest loan first", body = Vec<HistoryEntryDetails>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_history(
    State(state): State<crate::AppState>,
    user: CurrentUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<HistoryEntryDetails>>> {
    user.require_admin()?;

    let entries = state.services.borrowing.list_history_for_user(user_id).await?;
    Ok(Json(entries))
}
