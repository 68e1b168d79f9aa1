//! Repository layer for database operations
//!
//! Each entity is reached through its own store trait so services can be
//! exercised against mocks; the `*Repository` structs are the PostgreSQL
//! implementations built once at startup.

pub mod books;
pub mod loans;
pub mod members;
pub mod users;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookFilter, BookInput},
        loan::{Loan, LoanQuery, LoanRecord, LoanStatus},
        member::{Member, MemberInput},
        user::{NewUser, UpdateProfile, User},
    },
};

/// Book persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksStore: Send + Sync {
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Book>;
    async fn create(&self, book: &BookInput) -> AppResult<Book>;
    async fn update(&self, id: i32, book: &BookInput) -> AppResult<Book>;
    /// Deletes the book and, by cascade, its loans
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn count(&self) -> AppResult<i64>;
}

/// Member persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembersStore: Send + Sync {
    async fn list(&self, search: Option<String>) -> AppResult<Vec<Member>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Member>;
    async fn create(&self, member: &MemberInput) -> AppResult<Member>;
    async fn update(&self, id: i32, member: &MemberInput) -> AppResult<Member>;
    /// Deletes the member and, by cascade, their loans
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn count(&self) -> AppResult<i64>;
}

/// Loan persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoansStore: Send + Sync {
    /// Loans matching the query, most recent borrow date first
    async fn list(&self, query: &LoanQuery) -> AppResult<Vec<Loan>>;
    async fn get_by_id(&self, id: i32) -> AppResult<Loan>;
    /// ID of the active loan holding `book_id`, if any
    async fn active_loan_for_book(&self, book_id: i32) -> AppResult<Option<i32>>;
    /// Inserts a loan; a second active loan for the same book is rejected
    /// with `AppError::BookUnavailable`
    async fn create(&self, loan: &LoanRecord) -> AppResult<Loan>;
    async fn update(&self, id: i32, loan: &LoanRecord) -> AppResult<Loan>;
    /// Moves an active loan to completed; fails with
    /// `AppError::AlreadyReturned` if it is no longer active
    async fn mark_returned(&self, id: i32, returned_on: NaiveDate) -> AppResult<Loan>;
    async fn delete(&self, id: i32) -> AppResult<()>;
    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;
}

/// API user persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersStore: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<User>;
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool>;
    async fn create(&self, user: &NewUser) -> AppResult<User>;
    async fn update_profile(
        &self,
        id: i32,
        profile: &UpdateProfile,
        password_hash: Option<String>,
    ) -> AppResult<User>;
}

/// Database connectivity check
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub loans: loans::LoansRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl DatabaseHealth for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Case-insensitive LIKE pattern matching `term` anywhere, with LIKE
/// metacharacters escaped
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Dune"), "%dune%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
    }
}
