//! Borrow request model, status transitions and admissibility

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::interval::DateRange;

/// Lifecycle status of a borrow request
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
        }
    }

    /// Apply an admin decision. Only legal from `Pending`.
    pub fn decide(self, action: DecisionAction) -> AppResult<RequestStatus> {
        match self {
            RequestStatus::Pending => Ok(match action {
                DecisionAction::Approve => RequestStatus::Approved,
                DecisionAction::Deny => RequestStatus::Denied,
            }),
            other => Err(AppError::InvalidTransition(format!(
                "request is already {}",
                other.as_str()
            ))),
        }
    }

    /// Statuses that reserve the book's calendar: a denied request frees its
    /// interval, a pending one holds it until the decision is made.
    pub fn blocks_admission(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Approved)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Approve,
    Deny,
}

impl FromStr for DecisionAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(DecisionAction::Approve),
            "deny" => Ok(DecisionAction::Deny),
            other => Err(AppError::InvalidAction(format!(
                "unknown action '{}', expected 'approve' or 'deny'",
                other
            ))),
        }
    }
}

/// Borrow request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RequestStatus,
}

impl BorrowRequest {
    pub fn range(&self) -> DateRange {
        // start <= end is enforced at admission and by the schema
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Scheduler check: a request is admissible iff its range overlaps none
    /// of the intervals currently reserving the book.
    pub fn check_admissible(requested: &DateRange, existing: &[DateRange]) -> AppResult<()> {
        if existing.iter().any(|r| r.overlaps(requested)) {
            return Err(AppError::Conflict(
                "book is already requested or borrowed in this period".to_string(),
            ));
        }
        Ok(())
    }
}

/// Borrow request with requester and book resolved for admin display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct BorrowRequestDetails {
    pub id: i32,
    pub user_email: String,
    pub book_title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RequestStatus,
}
