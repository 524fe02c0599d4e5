//! Borrow history ledger repository
//!
//! Append-only: rows are inserted on approval (see the requests repository)
//! and closed exactly once; nothing here deletes or rewrites an entry.

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::history::{HistoryEntry, HistoryEntryDetails},
};

#[derive(Clone)]
pub struct HistoryRepository {
    pool: Pool<Postgres>,
}

impl HistoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get ledger entry by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<HistoryEntry> {
        sqlx::query_as::<_, HistoryEntry>("SELECT * FROM borrow_history WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("History entry with id {} not found", id)))
    }

    /// Entry for a (user, book) loan starting on `borrowed_date`, preferring
    /// the open one.
    ///
    /// A user may hold several non-overlapping loans of the same book, each
    /// with its own ledger entry; the borrowed date pins the one belonging
    /// to the request being returned. A closed entry is only selected when
    /// no open one exists, so a double return reaches `close_entry` and
    /// fails there with `AlreadyReturned` rather than `NotFound`.
    pub async fn find_open_for(
        &self,
        user_id: i32,
        book_id: i32,
        borrowed_date: NaiveDate,
    ) -> AppResult<HistoryEntry> {
        sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT * FROM borrow_history
            WHERE user_id = $1 AND book_id = $2
              AND borrowed_date = $3
            ORDER BY (returned_date IS NULL) DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(borrowed_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No history entry for user {}, book {} borrowed on {}",
                user_id, book_id, borrowed_date
            ))
        })
    }

    /// Set the returned date on an open entry.
    ///
    /// The row lock makes the read-guards-write sequence atomic, so a
    /// concurrent double-close loses with `AlreadyReturned`.
    pub async fn close_entry(&self, id: i32, returned_date: NaiveDate) -> AppResult<HistoryEntry> {
        let mut tx = self.pool.begin().await?;

        let entry = sqlx::query_as::<_, HistoryEntry>(
            "SELECT * FROM borrow_history WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("History entry with id {} not found", id)))?;

        if entry.returned_date.is_some() {
            return Err(AppError::AlreadyReturned(format!(
                "history entry {} is already closed",
                id
            )));
        }

        if returned_date < entry.borrowed_date {
            return Err(AppError::InvalidRange(format!(
                "returned date {} is before borrowed date {}",
                returned_date, entry.borrowed_date
            )));
        }

        let updated = sqlx::query_as::<_, HistoryEntry>(
            "UPDATE borrow_history SET returned_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(returned_date)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(entry_id = id, %returned_date, "history entry closed");

        Ok(updated)
    }

    /// A user's ledger, book titles resolved, oldest loan first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<HistoryEntryDetails>> {
        let entries = sqlx::query_as::<_, HistoryEntryDetails>(
            r#"
            SELECT h.id, b.title AS book_title, b.author AS book_author,
                   h.borrowed_date, h.returned_date
            FROM borrow_history h
            JOIN books b ON h.book_id = b.id
            WHERE h.user_id = $1
            ORDER BY h.borrowed_date ASC, h.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
