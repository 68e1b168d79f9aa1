//! Liveness and readiness endpoints for load balancers and orchestrators

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

const SERVICE: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `/health` body: the process is up and serving requests
#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessReport {
    #[schema(example = "inventaris-server")]
    pub service: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    #[schema(example = "healthy")]
    pub status: &'static str,
}

/// `/ready` body: the catalogue database answered a ping
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessReport {
    pub service: &'static str,
    pub version: &'static str,
    #[schema(example = "ready")]
    pub status: &'static str,
    #[schema(example = "reachable")]
    pub database: &'static str,
}

/// Liveness; never touches the database
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server process is running", body = LivenessReport)
    )
)]
pub async fn health_check() -> Json<LivenessReport> {
    Json(LivenessReport { service: SERVICE, version: VERSION, status: "healthy" })
}

/// Readiness: books, members and loans can be served only while the database is reachable
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable, requests can be served", body = ReadinessReport),
        (status = 500, description = "Database unreachable", body = crate::error::ErrorResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<ReadinessReport>> {
    state.services.health.ping().await?;
    tracing::debug!("Readiness ping succeeded");

    Ok(Json(ReadinessReport {
        service: SERVICE,
        version: VERSION,
        status: "ready",
        database: "reachable",
    }))
}
