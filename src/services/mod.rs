//! Business logic services

pub mod auth;
pub mod books;
pub mod dashboard;
pub mod loans;
pub mod members;

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    repository::{BooksStore, DatabaseHealth, LoansStore, MembersStore, Repository, UsersStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    pub dashboard: dashboard::DashboardService,
    pub health: Arc<dyn DatabaseHealth>,
}

/// Store implementations the services are built on
pub struct Stores {
    pub books: Arc<dyn BooksStore>,
    pub members: Arc<dyn MembersStore>,
    pub loans: Arc<dyn LoansStore>,
    pub users: Arc<dyn UsersStore>,
    pub health: Arc<dyn DatabaseHealth>,
}

impl Services {
    /// Create all services backed by the PostgreSQL repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        let stores = Stores {
            books: Arc::new(repository.books.clone()),
            members: Arc::new(repository.members.clone()),
            loans: Arc::new(repository.loans.clone()),
            users: Arc::new(repository.users.clone()),
            health: Arc::new(repository),
        };
        Self::from_stores(stores, auth_config)
    }

    /// Create all services over arbitrary store implementations
    pub fn from_stores(stores: Stores, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(stores.users, auth_config),
            books: books::BooksService::new(stores.books.clone()),
            members: members::MembersService::new(stores.members.clone()),
            loans: loans::LoansService::new(
                stores.loans.clone(),
                stores.books.clone(),
                stores.members.clone(),
            ),
            dashboard: dashboard::DashboardService::new(stores.books, stores.members, stores.loans),
            health: stores.health,
        }
    }
}
