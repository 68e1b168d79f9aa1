//! Dashboard statistics service

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{dashboard::DashboardStats, loan::LoanStatus},
    repository::{BooksStore, LoansStore, MembersStore},
};

#[derive(Clone)]
pub struct DashboardService {
    books: Arc<dyn BooksStore>,
    members: Arc<dyn MembersStore>,
    loans: Arc<dyn LoansStore>,
}

impl DashboardService {
    pub fn new(
        books: Arc<dyn BooksStore>,
        members: Arc<dyn MembersStore>,
        loans: Arc<dyn LoansStore>,
    ) -> Self {
        Self { books, members, loans }
    }

    /// Current library-wide counts
    pub async fn stats(&self) -> AppResult<DashboardStats> {
        let (total_buku, total_anggota, total_dipinjam, total_selesai) = tokio::try_join!(
            self.books.count(),
            self.members.count(),
            self.loans.count_by_status(LoanStatus::Active),
            self.loans.count_by_status(LoanStatus::Completed),
        )?;

        Ok(DashboardStats {
            total_buku,
            total_anggota,
            total_dipinjam,
            total_selesai,
            // At most one active loan per book
            buku_tersedia: total_buku - total_dipinjam,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockBooksStore, MockLoansStore, MockMembersStore};

    #[tokio::test]
    async fn test_available_books_is_total_minus_borrowed() {
        let mut books = MockBooksStore::new();
        books.expect_count().returning(|| Ok(12));
        let mut members = MockMembersStore::new();
        members.expect_count().returning(|| Ok(4));
        let mut loans = MockLoansStore::new();
        loans.expect_count_by_status().returning(|status| {
            Ok(match status {
                LoanStatus::Active => 5,
                LoanStatus::Completed => 9,
            })
        });

        let stats = DashboardService::new(Arc::new(books), Arc::new(members), Arc::new(loans))
            .stats()
            .await
            .unwrap();

        assert_eq!(
            stats,
            DashboardStats {
                total_buku: 12,
                total_anggota: 4,
                total_dipinjam: 5,
                total_selesai: 9,
                buku_tersedia: 7,
            }
        );
        assert_eq!(stats.buku_tersedia, stats.total_buku - stats.total_dipinjam);
    }
}
