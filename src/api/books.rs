//! Catalog endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::book::Book};

use super::CurrentUser;

/// List the book catalog
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All cataloged books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    _user: CurrentUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    _user: CurrentUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(book_id).await?;
    Ok(Json(book))
}
