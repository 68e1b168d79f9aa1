//! Loan (peminjaman) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use super::book::Book;
use super::member::Member;

/// Loan status. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    /// Book is currently borrowed
    #[serde(rename = "aktif")]
    Active,
    /// Book has been returned
    #[serde(rename = "selesai")]
    Completed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "aktif",
            LoanStatus::Completed => "selesai",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Aktif (Sedang Dipinjam)",
            LoanStatus::Completed => "Selesai (Sudah Dikembalikan)",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aktif" => Ok(LoanStatus::Active),
            "selesai" => Ok(LoanStatus::Completed),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as text)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Loan with book and member details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: i32,
    /// Book ID
    #[serde(rename = "buku")]
    pub book_id: i32,
    #[serde(rename = "buku_detail")]
    pub book: Book,
    /// Member ID
    #[serde(rename = "anggota")]
    pub member_id: i32,
    #[serde(rename = "anggota_detail")]
    pub member: Member,
    #[serde(rename = "tanggal_pinjam")]
    pub borrow_date: NaiveDate,
    #[serde(rename = "tanggal_kembali")]
    pub return_date: Option<NaiveDate>,
    #[serde(rename = "status_peminjaman")]
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Writable fields of this loan
    pub fn record(&self) -> LoanRecord {
        LoanRecord {
            book_id: self.book_id,
            member_id: self.member_id,
            borrow_date: self.borrow_date,
            return_date: self.return_date,
            status: self.status,
        }
    }
}

/// Flat loan row joined with its book and member
#[derive(Debug, FromRow)]
pub struct LoanRow {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub borrow_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub book_title: String,
    pub book_author: String,
    pub book_year: i32,
    pub book_is_available: bool,
    pub member_name: String,
    pub member_email: String,
    pub member_total_loans: i64,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Loan {
            id: row.id,
            book_id: row.book_id,
            book: Book {
                id: row.book_id,
                title: row.book_title,
                author: row.book_author,
                year: row.book_year,
                is_available: row.book_is_available,
            },
            member_id: row.member_id,
            member: Member {
                id: row.member_id,
                name: row.member_name,
                email: row.member_email,
                total_loans: row.member_total_loans,
            },
            borrow_date: row.borrow_date,
            return_date: row.return_date,
            status: row.status,
        }
    }
}

/// Values written to the loans table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    pub book_id: i32,
    pub member_id: i32,
    pub borrow_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLoan {
    /// Book ID
    #[serde(rename = "buku")]
    pub book_id: i32,
    /// Member ID
    #[serde(rename = "anggota")]
    pub member_id: i32,
    #[serde(rename = "tanggal_pinjam")]
    pub borrow_date: NaiveDate,
    /// Accepted for compatibility; new loans never carry a return date
    #[serde(rename = "tanggal_kembali", default)]
    pub return_date: Option<NaiveDate>,
}

/// Full loan update (PUT)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateLoan {
    #[serde(rename = "buku")]
    pub book_id: i32,
    #[serde(rename = "anggota")]
    pub member_id: i32,
    #[serde(rename = "tanggal_pinjam")]
    pub borrow_date: NaiveDate,
    /// Omitted keeps the stored date; `null` clears it
    #[serde(
        rename = "tanggal_kembali",
        default,
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<NaiveDate>)]
    pub return_date: Option<Option<NaiveDate>>,
    /// Defaults to the current status when omitted
    #[serde(rename = "status_peminjaman", default)]
    pub status: Option<LoanStatus>,
}

/// Partial loan update (PATCH)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatchLoan {
    #[serde(rename = "buku")]
    pub book_id: Option<i32>,
    #[serde(rename = "anggota")]
    pub member_id: Option<i32>,
    #[serde(rename = "tanggal_pinjam")]
    pub borrow_date: Option<NaiveDate>,
    #[serde(
        rename = "tanggal_kembali",
        default,
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<NaiveDate>)]
    pub return_date: Option<Option<NaiveDate>>,
    #[serde(rename = "status_peminjaman")]
    pub status: Option<LoanStatus>,
}

impl UpdateLoan {
    pub fn apply(self, current: &Loan) -> LoanRecord {
        LoanRecord {
            book_id: self.book_id,
            member_id: self.member_id,
            borrow_date: self.borrow_date,
            return_date: self.return_date.unwrap_or(current.return_date),
            status: self.status.unwrap_or(current.status),
        }
    }
}

impl PatchLoan {
    pub fn apply(self, current: &Loan) -> LoanRecord {
        LoanRecord {
            book_id: self.book_id.unwrap_or(current.book_id),
            member_id: self.member_id.unwrap_or(current.member_id),
            borrow_date: self.borrow_date.unwrap_or(current.borrow_date),
            return_date: self.return_date.unwrap_or(current.return_date),
            status: self.status.unwrap_or(current.status),
        }
    }
}

/// Loan list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    /// Filter by status (aktif/selesai)
    pub status: Option<LoanStatus>,
    /// Filter by member ID
    #[serde(rename = "anggota")]
    pub member_id: Option<i32>,
    /// Filter by book ID
    #[serde(rename = "buku")]
    pub book_id: Option<i32>,
}

/// Return action response
#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    pub data: Loan,
}
