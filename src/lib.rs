//! Stacks - library borrowing and circulation server
//!
//! Users request to borrow books for a date range, administrators approve or
//! deny those requests, and completed borrow/return cycles land in an
//! append-only history ledger. The engine guarantees that no two overlapping
//! pending/approved requests exist for the same book.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
