//! Dashboard counters

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Library-wide counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_buku: i64,
    pub total_anggota: i64,
    /// Active loans
    pub total_dipinjam: i64,
    /// Completed loans
    pub total_selesai: i64,
    /// Books without an active loan
    pub buku_tersedia: i64,
}
