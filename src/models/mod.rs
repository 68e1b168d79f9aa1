//! Data models for Inventaris

pub mod book;
pub mod dashboard;
pub mod loan;
pub mod member;
pub mod user;

// Re-export commonly used types
pub use book::Book;
pub use dashboard::DashboardStats;
pub use loan::{Loan, LoanStatus};
pub use member::Member;
pub use user::User;
