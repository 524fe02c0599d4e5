//! Business logic services

pub mod borrowing;
pub mod catalog;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub borrowing: borrowing::BorrowingService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            borrowing: borrowing::BorrowingService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository),
        }
    }
}
