//! Loan management service

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::borrow_log::{BorrowLog, BorrowRequest, ReturnManyRequest},
    repository::{Library, Repository},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    default_loan_days: u32,
}

impl LoansService {
    pub fn new(repository: Repository, default_loan_days: u32) -> Self {
        Self {
            repository,
            default_loan_days,
        }
    }

    /// Lend copies as described by a borrow request: a single copy when
    /// `copies` is absent, otherwise an all-or-nothing batch
    pub fn borrow(&self, request: BorrowRequest) -> AppResult<Vec<BorrowLog>> {
        match request.copies {
            None => self
                .borrow_one(request.borrower_id, &request.book_id, request.days)
                .map(|log| vec![log]),
            Some(count) => self.borrow_many(request.borrower_id, &request.book_id, count, request.days),
        }
    }

    /// Lend one copy of a book
    pub fn borrow_one(&self, borrower_id: Uuid, book_id: &str, days: Option<u32>) -> AppResult<BorrowLog> {
        let loan_days = days.unwrap_or(self.default_loan_days);
        let log = self.repository.write(|library| {
            let Library {
                catalog,
                directory,
                ledger,
            } = library;
            ledger.borrow_one(catalog, directory, borrower_id, book_id, loan_days, Utc::now())
        })?;

        tracing::info!(log_id = %log.id, borrower_id = %borrower_id, book_id = %book_id, "Book borrowed");
        Ok(log)
    }

    /// Lend `count` copies of a book in one step
    pub fn borrow_many(
        &self,
        borrower_id: Uuid,
        book_id: &str,
        count: u32,
        days: Option<u32>,
    ) -> AppResult<Vec<BorrowLog>> {
        let loan_days = days.unwrap_or(self.default_loan_days);
        let logs = self.repository.write(|library| {
            let Library {
                catalog,
                directory,
                ledger,
            } = library;
            ledger.borrow_many(catalog, directory, borrower_id, book_id, count, loan_days, Utc::now())
        })?;

        tracing::info!(borrower_id = %borrower_id, book_id = %book_id, count, "Books borrowed");
        Ok(logs)
    }

    /// Return a borrowed copy
    pub fn return_one(&self, log_id: Uuid) -> AppResult<BorrowLog> {
        let log = self.repository.write(|library| {
            let Library {
                catalog, ledger, ..
            } = library;
            ledger.return_one(catalog, log_id, Utc::now())
        })?;

        tracing::info!(log_id = %log_id, book_id = %log.book_id, "Book returned");
        Ok(log)
    }

    /// Return the oldest active copies a borrower holds of a book
    pub fn return_many(&self, request: ReturnManyRequest) -> AppResult<Vec<BorrowLog>> {
        let logs = self.repository.write(|library| {
            let Library {
                catalog, ledger, ..
            } = library;
            ledger.return_many(
                catalog,
                request.borrower_id,
                &request.book_id,
                request.count,
                Utc::now(),
            )
        })?;

        tracing::info!(
            borrower_id = %request.borrower_id,
            book_id = %request.book_id,
            count = request.count,
            "Books returned"
        );
        Ok(logs)
    }

    /// All borrow logs, most recent first
    pub fn list_logs(&self) -> AppResult<Vec<BorrowLog>> {
        self.repository.read(|library| library.ledger.list_all())
    }

    /// Count active loans
    pub fn count_active(&self) -> AppResult<usize> {
        self.repository
            .read(|library| library.ledger.iter().filter(|l| l.is_active()).count())
    }

    /// Count overdue loans
    pub fn count_overdue(&self) -> AppResult<usize> {
        let now = Utc::now();
        self.repository
            .read(|library| library.ledger.iter().filter(|l| l.is_overdue(now)).count())
    }
}
