//! Borrow history ledger model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Ledger entry: one completed or ongoing loan.
///
/// `returned_date = None` means the book is still out. Entries are never
/// deleted; the only permitted mutation is the single `returned_date` write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct HistoryEntry {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrowed_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
}

/// Ledger entry with the book resolved for display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct HistoryEntryDetails {
    pub id: i32,
    pub book_title: String,
    pub book_author: String,
    pub borrowed_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
}
