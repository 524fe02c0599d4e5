//! Borrow requests repository
//!
//! The admission scan and the insert that follows it run inside one
//! transaction holding a row lock on the book, so two concurrent submissions
//! for the same book serialize and the loser sees the winner's request.
//! Submissions for different books do not contend.

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        interval::DateRange,
        request::{BorrowRequest, BorrowRequestDetails, DecisionAction, RequestStatus},
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))
    }

    /// Admit and create a new pending request.
    ///
    /// Single atomic unit: lock the book row, scan the intervals of
    /// pending/approved requests, insert only if nothing overlaps.
    pub async fn create_admitted(
        &self,
        user_id: i32,
        book_id: i32,
        range: DateRange,
    ) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        // Per-book serialization point for the check-then-insert sequence
        let locked: Option<i32> = sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "Book with id {} not found",
                book_id
            )));
        }

        let reserved: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
            r#"
            SELECT start_date, end_date
            FROM borrow_requests
            WHERE book_id = $1 AND status IN ('pending', 'approved')
            "#,
        )
        .bind(book_id)
        .fetch_all(&mut *tx)
        .await?;

        let reserved: Vec<DateRange> = reserved
            .into_iter()
            .map(|(start, end)| DateRange { start, end })
            .collect();

        BorrowRequest::check_admissible(&range, &reserved)?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (user_id, book_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id = request.id,
            book_id,
            user_id,
            "borrow request admitted"
        );

        Ok(request)
    }

    /// Apply an admin decision to a pending request.
    ///
    /// Locks the request row before reading its status, so a concurrent
    /// double-decide fails with `InvalidTransition` instead of clobbering.
    /// Approval opens the history ledger entry in the same transaction: an
    /// approved request without its ledger row is never observable.
    pub async fn decide(&self, id: i32, action: DecisionAction) -> AppResult<BorrowRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))?;

        let next = request.status.decide(action)?;

        let updated = sqlx::query_as::<_, BorrowRequest>(
            "UPDATE borrow_requests SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(next)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if next == RequestStatus::Approved {
            // The loan starts on the request's start date
            let entry_id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO borrow_history (user_id, book_id, borrowed_date)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(request.user_id)
            .bind(request.book_id)
            .bind(request.start_date)
            .fetch_one(&mut *tx)
            .await?;

            tracing::info!(request_id = id, entry_id, "history entry opened on approval");
        }

        tx.commit().await?;

        tracing::info!(request_id = id, status = %updated.status, "borrow request decided");

        Ok(updated)
    }

    /// All requests with requester and book resolved, for the admin view
    pub async fn list_all(&self) -> AppResult<Vec<BorrowRequestDetails>> {
        let requests = sqlx::query_as::<_, BorrowRequestDetails>(
            r#"
            SELECT r.id, u.email AS user_email, b.title AS book_title,
                   r.start_date, r.end_date, r.status
            FROM borrow_requests r
            JOIN users u ON r.user_id = u.id
            JOIN books b ON r.book_id = b.id
            ORDER BY r.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
