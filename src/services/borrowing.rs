//! Borrowing lifecycle service
//!
//! Coordinates the scheduler, the request state machine and the history
//! ledger for the three triggering events: submission, admin decision and
//! return. Every error from the layers below propagates unchanged.

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{
        history::{HistoryEntry, HistoryEntryDetails},
        interval::DateRange,
        request::{BorrowRequest, BorrowRequestDetails, DecisionAction, RequestStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowingService {
    repository: Repository,
}

impl BorrowingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Submit a borrow request for a book over a date range.
    ///
    /// The range is validated before any scan runs; admission itself is the
    /// repository's atomic check-then-insert.
    pub async fn submit_request(
        &self,
        user_id: i32,
        book_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<BorrowRequest> {
        let range = DateRange::new(start_date, end_date)?;

        // Verify requester exists
        self.repository.users.get_by_id(user_id).await?;

        self.repository
            .requests
            .create_admitted(user_id, book_id, range)
            .await
    }

    /// Approve or deny a pending request. `action` is the raw wire value.
    pub async fn decide_request(&self, request_id: i32, action: &str) -> AppResult<BorrowRequest> {
        let action: DecisionAction = action.parse()?;
        self.repository.requests.decide(request_id, action).await
    }

    /// Record the return of an approved request's loan.
    ///
    /// Resolves the ledger entry opened for this request's loan and closes
    /// it; a missing date means the book came back today.
    pub async fn record_return(
        &self,
        request_id: i32,
        returned_date: Option<NaiveDate>,
    ) -> AppResult<HistoryEntry> {
        let request = self.repository.requests.get_by_id(request_id).await?;

        if request.status != RequestStatus::Approved {
            return Err(AppError::InvalidTransition(format!(
                "request {} is {}, only approved loans can be returned",
                request_id, request.status
            )));
        }

        // Approval opened the entry with the request's start date, which is
        // what pins the right entry when the user has had several loans of
        // the same book.
        let entry = self
            .repository
            .history
            .find_open_for(request.user_id, request.book_id, request.start_date)
            .await?;

        let returned_date =
            returned_date.unwrap_or_else(|| chrono::Utc::now().date_naive());

        self.repository
            .history
            .close_entry(entry.id, returned_date)
            .await
    }

    /// All requests, for the admin view
    pub async fn list_requests(&self) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository.requests.list_all().await
    }

    /// A user's borrow history, oldest loan first
    pub async fn list_history_for_user(
        &self,
        user_id: i32,
    ) -> AppResult<Vec<HistoryEntryDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.history.list_for_user(user_id).await
    }
}
