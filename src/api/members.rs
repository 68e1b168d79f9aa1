//! Member (anggota) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        loan::Loan,
        member::{Member, MemberInput, MemberPatch, MemberQuery},
    },
    AppState,
};

use super::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser};

/// List members
#[utoipa::path(
    get,
    path = "/anggota/",
    tag = "anggota",
    params(MemberQuery),
    responses(
        (status = 200, description = "List of members", body = Vec<Member>)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MemberQuery>,
) -> AppResult<Json<Vec<Member>>> {
    let search = query.search.filter(|s| !s.trim().is_empty());
    let members = state.services.members.list(search).await?;
    Ok(Json(members))
}

/// Get member by ID
#[utoipa::path(
    get,
    path = "/anggota/{id}/",
    tag = "anggota",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = Member),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Member>> {
    let member = state.services.members.get(id).await?;
    Ok(Json(member))
}

/// Loan history of a member
#[utoipa::path(
    get,
    path = "/anggota/{id}/riwayat/",
    tag = "anggota",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member's loans, most recent first", body = Vec<Loan>),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn member_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.member_history(id).await?;
    Ok(Json(loans))
}

/// Create a new member
#[utoipa::path(
    post,
    path = "/anggota/",
    tag = "anggota",
    security(("bearer_auth" = [])),
    request_body = MemberInput,
    responses(
        (status = 201, description = "Member created", body = Member),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiJson(member): ApiJson<MemberInput>,
) -> AppResult<(StatusCode, Json<Member>)> {
    let created = state.services.members.create(member).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a member
#[utoipa::path(
    put,
    path = "/anggota/{id}/",
    tag = "anggota",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    request_body = MemberInput,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(member): ApiJson<MemberInput>,
) -> AppResult<Json<Member>> {
    let updated = state.services.members.update(id, member).await?;
    Ok(Json(updated))
}

/// Partially update a member
#[utoipa::path(
    patch,
    path = "/anggota/{id}/",
    tag = "anggota",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    request_body = MemberPatch,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn patch_member(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<MemberPatch>,
) -> AppResult<Json<Member>> {
    let updated = state.services.members.patch(id, patch).await?;
    Ok(Json(updated))
}

/// Delete a member and their loans
#[utoipa::path(
    delete,
    path = "/anggota/{id}/",
    tag = "anggota",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deleted"),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.members.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
