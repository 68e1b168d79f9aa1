//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{contains_pattern, BooksStore};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFilter, BookInput},
};

const ACTIVE_LOAN_EXISTS: &str =
    "EXISTS (SELECT 1 FROM loans l WHERE l.book_id = b.id AND l.status = 'aktif')";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksStore for BooksRepository {
    /// List books matching the filter
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = filter.search {
            params.push(contains_pattern(search));
            let idx = params.len();
            if filter.match_year {
                conditions.push(format!(
                    "(LOWER(b.title) LIKE ${idx} OR LOWER(b.author) LIKE ${idx} OR CAST(b.year AS TEXT) LIKE ${idx})"
                ));
            } else {
                conditions.push(format!(
                    "(LOWER(b.title) LIKE ${idx} OR LOWER(b.author) LIKE ${idx})"
                ));
            }
        }

        match filter.available {
            Some(true) => conditions.push(format!("NOT {}", ACTIVE_LOAN_EXISTS)),
            Some(false) => conditions.push(ACTIVE_LOAN_EXISTS.to_string()),
            None => {}
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            r#"
            SELECT b.id, b.title, b.author, b.year, NOT {} AS is_available
            FROM books b
            {}
            ORDER BY b.id
            "#,
            ACTIVE_LOAN_EXISTS, where_clause
        );

        let mut builder = sqlx::query_as::<_, Book>(&query);
        for param in &params {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Get book by ID
    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!(
            "SELECT b.id, b.title, b.author, b.year, NOT {} AS is_available FROM books b WHERE b.id = $1",
            ACTIVE_LOAN_EXISTS
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Create a new book
    async fn create(&self, book: &BookInput) -> AppResult<Book> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO books (title, author, year) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Replace a book's fields
    async fn update(&self, id: i32, book: &BookInput) -> AppResult<Book> {
        let result = sqlx::query("UPDATE books SET title = $1, author = $2, year = $3 WHERE id = $4")
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.year)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book (loans are removed by ON DELETE CASCADE)
    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Count all books
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
