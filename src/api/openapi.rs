//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, dashboard, health, loans, members};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventaris API",
        version = "1.0.0",
        description = "Library inventory REST API: books, members and loans"
    ),
    servers(
        (url = "/api", description = "JSON API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::refresh,
        auth::profile,
        auth::update_profile,
        // Dashboard
        dashboard::get_dashboard,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::patch_book,
        books::delete_book,
        // Members
        members::list_members,
        members::get_member,
        members::member_history,
        members::create_member,
        members::update_member,
        members::patch_member,
        members::delete_member,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::update_loan,
        loans::patch_loan,
        loans::delete_loan,
        loans::return_loan,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::User,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateProfile,
            crate::models::user::LoginRequest,
            crate::models::user::RefreshRequest,
            crate::models::user::TokenPair,
            crate::models::user::AccessToken,
            // Library
            crate::models::dashboard::DashboardStats,
            crate::models::book::Book,
            crate::models::book::BookInput,
            crate::models::book::BookPatch,
            crate::models::member::Member,
            crate::models::member::MemberInput,
            crate::models::member::MemberPatch,
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::CreateLoan,
            crate::models::loan::UpdateLoan,
            crate::models::loan::PatchLoan,
            crate::models::loan::ReturnResponse,
            // Health
            health::LivenessReport,
            health::ReadinessReport,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and readiness checks"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "dashboard", description = "Library statistics"),
        (name = "buku", description = "Book management"),
        (name = "anggota", description = "Member management"),
        (name = "peminjaman", description = "Loan management")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/schema/", ApiDoc::openapi()))
        .merge(Redoc::with_url("/api/redoc/", ApiDoc::openapi()))
}
