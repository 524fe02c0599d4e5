//! Data models for Stacks

pub mod book;
pub mod history;
pub mod interval;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use history::{HistoryEntry, HistoryEntryDetails};
pub use interval::DateRange;
pub use request::{BorrowRequest, BorrowRequestDetails, DecisionAction, RequestStatus};
pub use user::{Role, User};
