//! Inventaris: library inventory server
//!
//! Tracks books, members and loans, allowing at most one active loan per
//! book. Exposes a JSON API under `/api` and a browser form interface.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod router;
pub mod services;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
