//! Loans repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, QueryBuilder};

use super::LoansStore;
use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanQuery, LoanRecord, LoanRow, LoanStatus},
};

const LOAN_SELECT: &str = r#"
    SELECT l.id, l.book_id, l.member_id, l.borrow_date, l.return_date, l.status,
           b.title AS book_title, b.author AS book_author, b.year AS book_year,
           NOT EXISTS (
               SELECT 1 FROM loans a WHERE a.book_id = b.id AND a.status = 'aktif'
           ) AS book_is_available,
           m.name AS member_name, m.email AS member_email,
           (SELECT COUNT(*) FROM loans c WHERE c.member_id = m.id) AS member_total_loans
    FROM loans l
    JOIN books b ON b.id = l.book_id
    JOIN members m ON m.id = l.member_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations raised by loan writes.
///
/// `loans_one_active_per_book` is the database-level guard for the
/// one-active-loan-per-book rule.
fn map_write_error(err: sqlx::Error, loan: &LoanRecord) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            tracing::warn!(book_id = loan.book_id, "Concurrent active loan rejected by constraint");
            return AppError::BookUnavailable(format!(
                "Book {} is already on an active loan",
                loan.book_id
            ));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::Validation(format!(
                "Book {} or member {} does not exist",
                loan.book_id, loan.member_id
            ));
        }
    }
    err.into()
}

#[async_trait]
impl LoansStore for LoansRepository {
    /// List loans, most recent first
    async fn list(&self, query: &LoanQuery) -> AppResult<Vec<Loan>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(LOAN_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(status) = query.status {
            builder.push(" AND l.status = ").push_bind(status);
        }
        if let Some(member_id) = query.member_id {
            builder.push(" AND l.member_id = ").push_bind(member_id);
        }
        if let Some(book_id) = query.book_id {
            builder.push(" AND l.book_id = ").push_bind(book_id);
        }
        builder.push(" ORDER BY l.borrow_date DESC, l.id DESC");

        let rows = builder
            .build_query_as::<LoanRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Loan::from).collect())
    }

    /// Get loan by ID
    async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        let query = format!("{} WHERE l.id = $1", LOAN_SELECT);
        sqlx::query_as::<_, LoanRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Loan::from)
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    async fn active_loan_for_book(&self, book_id: i32) -> AppResult<Option<i32>> {
        let id = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM loans WHERE book_id = $1 AND status = 'aktif' LIMIT 1",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Create a new loan
    async fn create(&self, loan: &LoanRecord) -> AppResult<Loan> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loans (book_id, member_id, borrow_date, return_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(loan.book_id)
        .bind(loan.member_id)
        .bind(loan.borrow_date)
        .bind(loan.return_date)
        .bind(loan.status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, loan))?;

        self.get_by_id(id).await
    }

    /// Replace a loan's fields
    async fn update(&self, id: i32, loan: &LoanRecord) -> AppResult<Loan> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET book_id = $1, member_id = $2, borrow_date = $3, return_date = $4, status = $5
            WHERE id = $6
            "#,
        )
        .bind(loan.book_id)
        .bind(loan.member_id)
        .bind(loan.borrow_date)
        .bind(loan.return_date)
        .bind(loan.status)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, loan))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Loan with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Complete an active loan
    async fn mark_returned(&self, id: i32, returned_on: NaiveDate) -> AppResult<Loan> {
        let result = sqlx::query(
            "UPDATE loans SET status = $1, return_date = $2 WHERE id = $3 AND status = $4",
        )
        .bind(LoanStatus::Completed)
        .bind(returned_on)
        .bind(id)
        .bind(LoanStatus::Active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either gone or completed by a concurrent request
            self.get_by_id(id).await?;
            return Err(AppError::AlreadyReturned(format!(
                "Loan {} has already been returned",
                id
            )));
        }

        self.get_by_id(id).await
    }

    /// Delete a loan
    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Loan with id {} not found", id)));
        }
        Ok(())
    }

    /// Count loans with the given status
    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
