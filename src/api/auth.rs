//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{
        AccessToken, LoginRequest, RefreshRequest, RegisterUser, TokenPair, UpdateProfile, User,
    },
    AppState,
};

use super::{ApiJson, AuthenticatedUser};

/// Register a new API user
#[utoipa::path(
    post,
    path = "/auth/register/",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Obtain an access/refresh token pair
#[utoipa::path(
    post,
    path = "/auth/login/",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let tokens = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh/",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Invalid refresh token", body = crate::error::ErrorResponse)
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> AppResult<Json<AccessToken>> {
    let access = state.services.auth.refresh(&request.refresh).await?;
    Ok(Json(AccessToken { access }))
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/auth/profile/",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.profile(claims.user_id).await?;
    Ok(Json(user))
}

/// Update the current user's profile
#[utoipa::path(
    put,
    path = "/auth/profile/",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 409, description = "Username already exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<UpdateProfile>,
) -> AppResult<Json<User>> {
    let user = state
        .services
        .auth
        .update_profile(claims.user_id, request)
        .await?;
    Ok(Json(user))
}
