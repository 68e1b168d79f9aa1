//! Loan (peminjaman) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanQuery, PatchLoan, ReturnResponse, UpdateLoan},
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser};

/// List loans, most recent borrow date first
#[utoipa::path(
    get,
    path = "/peminjaman/",
    tag = "peminjaman",
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = Vec<Loan>),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LoanQuery>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list(&query).await?;
    Ok(Json(loans))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/peminjaman/{id}/",
    tag = "peminjaman",
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get(id).await?;
    Ok(Json(loan))
}

/// Create a new loan (borrow a book)
#[utoipa::path(
    post,
    path = "/peminjaman/",
    tag = "peminjaman",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Book is on loan or invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state.services.loans.create_loan(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Replace a loan
#[utoipa::path(
    put,
    path = "/peminjaman/{id}/",
    tag = "peminjaman",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 400, description = "Invalid update", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(update): ApiJson<UpdateLoan>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.update_loan(id, update).await?;
    Ok(Json(loan))
}

/// Partially update a loan
#[utoipa::path(
    patch,
    path = "/peminjaman/{id}/",
    tag = "peminjaman",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = PatchLoan,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 400, description = "Invalid update", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn patch_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<PatchLoan>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.patch_loan(id, patch).await?;
    Ok(Json(loan))
}

/// Delete a loan
#[utoipa::path(
    delete,
    path = "/peminjaman/{id}/",
    tag = "peminjaman",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.loans.delete_loan(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/peminjaman/{id}/kembalikan/",
    tag = "peminjaman",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let loan = state.services.loans.return_loan(id).await?;

    Ok(Json(ReturnResponse {
        message: format!("Book '{}' returned successfully", loan.book.title),
        data: loan,
    }))
}
