//! Dashboard endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::dashboard::DashboardStats, AppState};

/// Library-wide counts
#[utoipa::path(
    get,
    path = "/dashboard/",
    tag = "dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.dashboard.stats().await?;
    Ok(Json(stats))
}
