//! Book catalog service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, BookInput, BookPatch},
    repository::BooksStore,
};

#[derive(Clone)]
pub struct BooksService {
    books: Arc<dyn BooksStore>,
}

impl BooksService {
    pub fn new(books: Arc<dyn BooksStore>) -> Self {
        Self { books }
    }

    /// List books. `available` selects available (true) or borrowed (false) books.
    pub async fn list(&self, filter: &BookFilter) -> AppResult<Vec<Book>> {
        self.books.list(filter).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.books.get_by_id(id).await
    }

    pub async fn create(&self, book: BookInput) -> AppResult<Book> {
        book.validate()?;
        let created = self.books.create(&book).await?;
        tracing::info!(book_id = created.id, "Book created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, book: BookInput) -> AppResult<Book> {
        book.validate()?;
        self.books.update(id, &book).await
    }

    pub async fn patch(&self, id: i32, patch: BookPatch) -> AppResult<Book> {
        let current = self.books.get_by_id(id).await?;
        self.update(id, patch.apply(&current)).await
    }

    /// Delete a book together with its loans
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, repository::MockBooksStore};

    #[tokio::test]
    async fn test_invalid_book_is_not_stored() {
        let mut store = MockBooksStore::new();
        store.expect_create().never();

        let service = BooksService::new(Arc::new(store));
        let result = service
            .create(BookInput { title: String::new(), author: "Tolkien".into(), year: 1954 })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_patch_merges_with_stored_book() {
        let mut store = MockBooksStore::new();
        store.expect_get_by_id().returning(|id| {
            Ok(Book { id, title: "Dune".into(), author: "Frank Herbert".into(), year: 1965, is_available: true })
        });
        store
            .expect_update()
            .withf(|id, input| *id == 1 && input.title == "Dune Messiah" && input.year == 1965)
            .times(1)
            .returning(|id, input| {
                Ok(Book {
                    id,
                    title: input.title.clone(),
                    author: input.author.clone(),
                    year: input.year,
                    is_available: true,
                })
            });

        let service = BooksService::new(Arc::new(store));
        let patch = BookPatch { title: Some("Dune Messiah".into()), ..Default::default() };
        let updated = service.patch(1, patch).await.unwrap();
        assert_eq!(updated.author, "Frank Herbert");
    }
}
