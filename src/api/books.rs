//! Book (buku) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookFilter, BookInput, BookPatch, BookQuery},
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser};

/// List books
#[utoipa::path(
    get,
    path = "/buku/",
    tag = "buku",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let filter = BookFilter::from(query);
    let books = state.services.books.list(&filter).await?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/buku/{id}/",
    tag = "buku",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.get(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/buku/",
    tag = "buku",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiJson(book): ApiJson<BookInput>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a book
#[utoipa::path(
    put,
    path = "/buku/{id}/",
    tag = "buku",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(book): ApiJson<BookInput>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.update(id, book).await?;
    Ok(Json(updated))
}

/// Partially update a book
#[utoipa::path(
    patch,
    path = "/buku/{id}/",
    tag = "buku",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn patch_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<BookPatch>,
) -> AppResult<Json<Book>> {
    let updated = state.services.books.patch(id, patch).await?;
    Ok(Json(updated))
}

/// Delete a book and its loans
#[utoipa::path(
    delete,
    path = "/buku/{id}/",
    tag = "buku",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
