//! Repository layer for database operations

pub mod books;
pub mod history;
pub mod requests;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub requests: requests::RequestsRepository,
    pub history: history::HistoryRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            requests: requests::RequestsRepository::new(pool.clone()),
            history: history::HistoryRepository::new(pool.clone()),
            pool,
        }
    }
}
