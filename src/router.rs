//! Application route table

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, web, AppState};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Authentication
        .route("/auth/register/", post(api::auth::register))
        .route("/auth/login/", post(api::auth::login))
        .route("/auth/refresh/", post(api::auth::refresh))
        .route(
            "/auth/profile/",
            get(api::auth::profile).put(api::auth::update_profile),
        )
        // Dashboard
        .route("/dashboard/", get(api::dashboard::get_dashboard))
        // Books
        .route(
            "/buku/",
            get(api::books::list_books).post(api::books::create_book),
        )
        .route(
            "/buku/:id/",
            get(api::books::get_book)
                .put(api::books::update_book)
                .patch(api::books::patch_book)
                .delete(api::books::delete_book),
        )
        // Members
        .route(
            "/anggota/",
            get(api::members::list_members).post(api::members::create_member),
        )
        .route(
            "/anggota/:id/",
            get(api::members::get_member)
                .put(api::members::update_member)
                .patch(api::members::patch_member)
                .delete(api::members::delete_member),
        )
        .route("/anggota/:id/riwayat/", get(api::members::member_history))
        // Loans
        .route(
            "/peminjaman/",
            get(api::loans::list_loans).post(api::loans::create_loan),
        )
        .route(
            "/peminjaman/:id/",
            get(api::loans::get_loan)
                .put(api::loans::update_loan)
                .patch(api::loans::patch_loan)
                .delete(api::loans::delete_loan),
        )
        .route("/peminjaman/:id/kembalikan/", post(api::loans::return_loan));

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        .nest("/api", api_routes)
        .merge(web::create_web_router())
        .with_state(state)
        .merge(api::openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use chrono::{NaiveDate, Utc};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        error::AppError,
        models::{
            book::Book,
            loan::{Loan, LoanStatus},
            member::Member,
            user::{TokenType, User, UserClaims},
        },
        repository::{
            MockBooksStore, MockDatabaseHealth, MockLoansStore, MockMembersStore, MockUsersStore,
        },
        services::{Services, Stores},
    };

    #[derive(Default)]
    struct Mocks {
        books: MockBooksStore,
        members: MockMembersStore,
        loans: MockLoansStore,
        users: MockUsersStore,
        health: MockDatabaseHealth,
    }

    impl Mocks {
        fn into_app(self) -> Router {
            let config = AppConfig::default();
            let stores = Stores {
                books: Arc::new(self.books),
                members: Arc::new(self.members),
                loans: Arc::new(self.loans),
                users: Arc::new(self.users),
                health: Arc::new(self.health),
            };
            let services = Services::from_stores(stores, config.auth.clone());
            create_router(AppState {
                config: Arc::new(config),
                services: Arc::new(services),
            })
        }
    }

    fn dune(is_available: bool) -> Book {
        Book {
            id: 1,
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            year: 1965,
            is_available,
        }
    }

    fn loan(status: LoanStatus) -> Loan {
        let return_date = match status {
            LoanStatus::Active => None,
            LoanStatus::Completed => NaiveDate::from_ymd_opt(2025, 2, 1),
        };
        Loan {
            id: 5,
            book_id: 1,
            book: dune(status == LoanStatus::Completed),
            member_id: 2,
            member: Member {
                id: 2,
                name: "Alice".into(),
                email: "alice@example.org".into(),
                total_loans: 1,
            },
            borrow_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap_or_default(),
            return_date,
            status,
        }
    }

    fn access_token() -> String {
        let user = User {
            id: 1,
            username: "admin".into(),
            email: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            date_joined: Utc::now(),
        };
        UserClaims::issue(&user, TokenType::Access, chrono::Duration::minutes(5))
            .create_token(&AppConfig::default().auth.jwt_secret)
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = Mocks::default().into_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["service"], "inventaris-server");
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_when_database_answers() {
        let mut mocks = Mocks::default();
        mocks.health.expect_ping().times(1).returning(|| Ok(()));

        let response = mocks
            .into_app()
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["database"], "reachable");
    }

    #[tokio::test]
    async fn test_ready_reports_database_failure() {
        let mut mocks = Mocks::default();
        mocks
            .health
            .expect_ping()
            .returning(|| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let response = mocks
            .into_app()
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["message"], "Database error");
    }

    #[tokio::test]
    async fn test_borrowed_books_filter() {
        let mut mocks = Mocks::default();
        mocks
            .books
            .expect_list()
            .withf(|filter| filter.available == Some(false) && !filter.match_year)
            .times(1)
            .returning(|_| Ok(vec![dune(false)]));

        let response = mocks
            .into_app()
            .oneshot(
                Request::get("/api/buku/?available=false")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body[0]["judul"], "Dune");
        assert_eq!(body[0]["is_available"], false);
    }

    #[tokio::test]
    async fn test_writes_require_token() {
        let mut mocks = Mocks::default();
        mocks.books.expect_create().never();

        let response = mocks
            .into_app()
            .oneshot(
                Request::post("/api/buku/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"judul":"Dune","penulis":"Frank Herbert","tahun":1965}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_return_twice_is_bad_request() {
        let mut mocks = Mocks::default();
        mocks
            .loans
            .expect_get_by_id()
            .returning(|_| Ok(loan(LoanStatus::Completed)));
        mocks.loans.expect_mark_returned().never();

        let response = mocks
            .into_app()
            .oneshot(
                Request::post("/api/peminjaman/5/kembalikan/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", access_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "AlreadyReturned");
    }

    #[tokio::test]
    async fn test_return_active_loan() {
        let mut mocks = Mocks::default();
        mocks
            .loans
            .expect_get_by_id()
            .returning(|_| Ok(loan(LoanStatus::Active)));
        mocks
            .loans
            .expect_mark_returned()
            .times(1)
            .returning(|_, _| Ok(loan(LoanStatus::Completed)));

        let response = mocks
            .into_app()
            .oneshot(
                Request::post("/api/peminjaman/5/kembalikan/")
                    .header(header::AUTHORIZATION, format!("Bearer {}", access_token()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["message"], "Book 'Dune' returned successfully");
        assert_eq!(body["data"]["status_peminjaman"], "selesai");
    }

    #[tokio::test]
    async fn test_invalid_status_filter_is_rejected() {
        let mut mocks = Mocks::default();
        mocks.loans.expect_list().never();

        let response = mocks
            .into_app()
            .oneshot(
                Request::get("/api/peminjaman/?status=hilang")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(json_body(response).await["error"], "BadValue");
    }

    #[tokio::test]
    async fn test_loan_without_book_is_a_validation_error() {
        let mut mocks = Mocks::default();
        mocks.loans.expect_create().never();

        let response = mocks
            .into_app()
            .oneshot(
                Request::post("/api/peminjaman/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {}", access_token()))
                    .body(Body::from(r#"{"anggota":2,"tanggal_pinjam":"2025-01-01"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = json_body(response).await;
        assert_eq!(body["error"], "BadValue");
        assert_eq!(body["code"], 7);
        assert!(body["message"].as_str().unwrap_or_default().contains("buku"));
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_a_validation_error() {
        let mut mocks = Mocks::default();
        mocks.books.expect_get_by_id().never();

        let response = mocks
            .into_app()
            .oneshot(Request::get("/api/buku/dune/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "BadValue");
    }

    #[tokio::test]
    async fn test_web_return_redirects_with_notice() {
        let mut mocks = Mocks::default();
        mocks
            .loans
            .expect_get_by_id()
            .returning(|_| Ok(loan(LoanStatus::Active)));
        mocks
            .loans
            .expect_mark_returned()
            .returning(|_, _| Ok(loan(LoanStatus::Completed)));

        let response = mocks
            .into_app()
            .oneshot(
                Request::post("/peminjaman/5/kembalikan/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("/peminjaman/?pesan="));
    }

    #[tokio::test]
    async fn test_web_borrow_of_lent_book_rerenders_form() {
        let mut mocks = Mocks::default();
        mocks.books.expect_get_by_id().returning(|_| Ok(dune(false)));
        mocks.members.expect_get_by_id().returning(|id| {
            Ok(Member {
                id,
                name: "Bob".into(),
                email: "bob@example.org".into(),
                total_loans: 0,
            })
        });
        mocks.members.expect_list().returning(|_| Ok(vec![]));
        mocks.loans.expect_active_loan_for_book().returning(|_| Ok(Some(5)));
        mocks.loans.expect_create().never();

        let response = mocks
            .into_app()
            .oneshot(
                Request::post("/buku/1/pinjam/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("anggota=3&tanggal_pinjam=2025-02-03"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("currently on loan"));
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let mut mocks = Mocks::default();
        mocks.books.expect_count().returning(|| Ok(3));
        mocks.members.expect_count().returning(|| Ok(2));
        mocks.loans.expect_count_by_status().returning(|status| {
            Ok(match status {
                LoanStatus::Active => 1,
                LoanStatus::Completed => 4,
            })
        });

        let response = mocks
            .into_app()
            .oneshot(Request::get("/api/dashboard/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["buku_tersedia"], 2);
        assert_eq!(body["total_selesai"], 4);
    }
}
