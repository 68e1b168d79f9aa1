//! Loan management service
//!
//! Owns the one-active-loan-per-book rule and the `aktif -> selesai`
//! transition. Every loan write in the application goes through here; the
//! partial unique index on `loans` backs the rule up under concurrency.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{CreateLoan, Loan, LoanQuery, LoanRecord, LoanStatus, PatchLoan, UpdateLoan},
        member::Member,
    },
    repository::{BooksStore, LoansStore, MembersStore},
};

#[derive(Clone)]
pub struct LoansService {
    loans: Arc<dyn LoansStore>,
    books: Arc<dyn BooksStore>,
    members: Arc<dyn MembersStore>,
}

impl LoansService {
    pub fn new(
        loans: Arc<dyn LoansStore>,
        books: Arc<dyn BooksStore>,
        members: Arc<dyn MembersStore>,
    ) -> Self {
        Self { loans, books, members }
    }

    /// List loans matching the filters
    pub async fn list(&self, query: &LoanQuery) -> AppResult<Vec<Loan>> {
        self.loans.list(query).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Loan> {
        self.loans.get_by_id(id).await
    }

    /// Loan history of a member, most recent first
    pub async fn member_history(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        self.members.get_by_id(member_id).await?;
        let query = LoanQuery {
            member_id: Some(member_id),
            ..Default::default()
        };
        self.loans.list(&query).await
    }

    /// Create a new loan (borrow a book)
    pub async fn create_loan(&self, request: CreateLoan) -> AppResult<Loan> {
        let book = self.referenced_book(request.book_id).await?;
        self.referenced_member(request.member_id).await?;
        if request.return_date.is_some() {
            tracing::debug!(book_id = book.id, "Ignoring return date supplied for a new loan");
        }
        self.open_loan(&book, request.member_id, request.borrow_date).await
    }

    /// Borrow the book identified in the URL
    pub async fn borrow_book(
        &self,
        book_id: i32,
        member_id: i32,
        borrow_date: NaiveDate,
    ) -> AppResult<Loan> {
        let book = self.books.get_by_id(book_id).await?;
        self.referenced_member(member_id).await?;
        self.open_loan(&book, member_id, borrow_date).await
    }

    /// Return a borrowed book
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<Loan> {
        let loan = self.loans.get_by_id(loan_id).await?;
        if loan.status == LoanStatus::Completed {
            return Err(AppError::AlreadyReturned(
                "This book has already been returned".to_string(),
            ));
        }

        let returned = self.loans.mark_returned(loan_id, today()).await?;
        tracing::info!(loan_id, book_id = returned.book_id, "Book returned");
        Ok(returned)
    }

    /// Full update (PUT)
    pub async fn update_loan(&self, loan_id: i32, update: UpdateLoan) -> AppResult<Loan> {
        let current = self.loans.get_by_id(loan_id).await?;
        let record = update.apply(&current);
        self.rewrite(&current, record).await
    }

    /// Partial update (PATCH)
    pub async fn patch_loan(&self, loan_id: i32, patch: PatchLoan) -> AppResult<Loan> {
        let current = self.loans.get_by_id(loan_id).await?;
        let record = patch.apply(&current);
        self.rewrite(&current, record).await
    }

    pub async fn delete_loan(&self, loan_id: i32) -> AppResult<()> {
        self.loans.delete(loan_id).await?;
        tracing::info!(loan_id, "Loan deleted");
        Ok(())
    }

    async fn open_loan(&self, book: &Book, member_id: i32, borrow_date: NaiveDate) -> AppResult<Loan> {
        self.ensure_available(book, None).await?;

        let record = LoanRecord {
            book_id: book.id,
            member_id,
            borrow_date,
            return_date: None,
            status: LoanStatus::Active,
        };
        let loan = self.loans.create(&record).await?;
        tracing::info!(loan_id = loan.id, book_id = book.id, member_id, "Loan created");
        Ok(loan)
    }

    async fn rewrite(&self, current: &Loan, mut record: LoanRecord) -> AppResult<Loan> {
        check_transition(current, &mut record, today())?;

        let book = self.referenced_book(record.book_id).await?;
        if record.member_id != current.member_id {
            self.referenced_member(record.member_id).await?;
        }
        if record.status == LoanStatus::Active {
            self.ensure_available(&book, Some(current.id)).await?;
        }

        self.loans.update(current.id, &record).await
    }

    /// Fails if another active loan holds the book
    async fn ensure_available(&self, book: &Book, exclude_loan: Option<i32>) -> AppResult<()> {
        match self.loans.active_loan_for_book(book.id).await? {
            Some(active_id) if Some(active_id) != exclude_loan => {
                tracing::warn!(book_id = book.id, active_loan = active_id, "Book is already on loan");
                Err(AppError::BookUnavailable(format!(
                    "Book '{}' is currently on loan to another member",
                    book.title
                )))
            }
            _ => Ok(()),
        }
    }

    /// Book referenced from a request body; a missing book is a validation error
    async fn referenced_book(&self, book_id: i32) -> AppResult<Book> {
        match self.books.get_by_id(book_id).await {
            Err(AppError::NotFound(_)) => Err(AppError::Validation(format!(
                "Book with id {} does not exist",
                book_id
            ))),
            other => other,
        }
    }

    async fn referenced_member(&self, member_id: i32) -> AppResult<Member> {
        match self.members.get_by_id(member_id).await {
            Err(AppError::NotFound(_)) => Err(AppError::Validation(format!(
                "Member with id {} does not exist",
                member_id
            ))),
            other => other,
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Validate a generic rewrite of `current` into `record`.
///
/// Completing a loan without a return date stamps `today`.
fn check_transition(current: &Loan, record: &mut LoanRecord, today: NaiveDate) -> AppResult<()> {
    if current.status == LoanStatus::Completed && record.status == LoanStatus::Active {
        return Err(AppError::Validation(
            "A completed loan cannot be made active again".to_string(),
        ));
    }

    match record.status {
        LoanStatus::Active if record.return_date.is_some() => {
            return Err(AppError::Validation(
                "An active loan cannot have a return date".to_string(),
            ));
        }
        LoanStatus::Completed if record.return_date.is_none() => {
            record.return_date = Some(today);
        }
        _ => {}
    }

    if let Some(returned) = record.return_date {
        if returned < record.borrow_date {
            return Err(AppError::Validation(
                "Return date cannot be earlier than the borrow date".to_string(),
            ));
        }
    }

    Ok(())
}
