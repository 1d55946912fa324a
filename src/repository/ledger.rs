//! Borrow ledger: issues and retires borrow logs against catalog availability

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    config::{LendingConfig, OverReturnPolicy},
    error::{AppError, AppResult, ErrorCode},
    models::borrow_log::BorrowLog,
};

use super::{catalog::Catalog, directory::Directory};

/// Lending rules applied by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingRules {
    /// Refuse loans to ids that are not in the directory
    pub require_registered_borrower: bool,
    pub over_return_policy: OverReturnPolicy,
}

impl Default for LendingRules {
    fn default() -> Self {
        Self {
            require_registered_borrower: true,
            over_return_policy: OverReturnPolicy::Clamp,
        }
    }
}

impl From<&LendingConfig> for LendingRules {
    fn from(config: &LendingConfig) -> Self {
        Self {
            require_registered_borrower: config.require_registered_borrower,
            over_return_policy: config.over_return_policy,
        }
    }
}

/// All borrow logs, kept in issue order
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    logs: IndexMap<Uuid, BorrowLog>,
    rules: LendingRules,
}

impl Ledger {
    pub fn new(rules: LendingRules) -> Self {
        Self {
            logs: IndexMap::new(),
            rules,
        }
    }

    pub fn rules(&self) -> LendingRules {
        self.rules
    }

    /// Lend one copy of a book
    pub fn borrow_one(
        &mut self,
        catalog: &mut Catalog,
        directory: &Directory,
        borrower_id: Uuid,
        book_id: &str,
        loan_days: u32,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowLog> {
        let book = catalog.get(book_id)?;
        let loan_period = Self::loan_period(loan_days)?;
        self.check_borrower(directory, borrower_id)?;

        if book.available_copies == 0 {
            return Err(AppError::PreconditionFailed(
                ErrorCode::BookUnavailable,
                format!("Book {} is not available", book_id),
            ));
        }

        catalog.adjust_availability(book_id, -1, self.rules.over_return_policy)?;
        Ok(self.issue(borrower_id, book_id, loan_period, now))
    }

    /// Lend `count` copies of a book at once, or none at all
    pub fn borrow_many(
        &mut self,
        catalog: &mut Catalog,
        directory: &Directory,
        borrower_id: Uuid,
        book_id: &str,
        count: u32,
        loan_days: u32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BorrowLog>> {
        let book = catalog.get(book_id)?;
        if count < 1 {
            return Err(AppError::invalid_count(count));
        }
        let loan_period = Self::loan_period(loan_days)?;
        self.check_borrower(directory, borrower_id)?;

        if book.available_copies < count {
            return Err(AppError::PreconditionFailed(
                ErrorCode::InsufficientCopies,
                format!(
                    "Not enough copies available ({} requested, {} available)",
                    count, book.available_copies
                ),
            ));
        }

        catalog.adjust_availability(book_id, -i64::from(count), self.rules.over_return_policy)?;
        Ok((0..count)
            .map(|_| self.issue(borrower_id, book_id, loan_period, now))
            .collect())
    }

    /// Return one borrow log. Returning an already returned log is a no-op.
    pub fn return_one(
        &mut self,
        catalog: &mut Catalog,
        log_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<BorrowLog> {
        let log = self
            .logs
            .get(&log_id)
            .ok_or_else(|| AppError::log_not_found(log_id))?;

        if !log.is_active() {
            tracing::debug!(log_id = %log_id, "Borrow log already returned");
            return Ok(log.clone());
        }

        if catalog.find(&log.book_id).is_some() {
            catalog.adjust_availability(&log.book_id, 1, self.rules.over_return_policy)?;
        }

        let log = self
            .logs
            .get_mut(&log_id)
            .ok_or_else(|| AppError::log_not_found(log_id))?;
        log.returned_at = Some(now);
        Ok(log.clone())
    }

    /// Return the `count` oldest active logs of a (borrower, book) pair
    pub fn return_many(
        &mut self,
        catalog: &mut Catalog,
        borrower_id: Uuid,
        book_id: &str,
        count: u32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BorrowLog>> {
        if count < 1 {
            return Err(AppError::invalid_count(count));
        }

        let selected: Vec<Uuid> = self
            .logs
            .values()
            .filter(|l| l.is_active() && l.borrower_id == borrower_id && l.book_id == book_id)
            .take(count as usize)
            .map(|l| l.id)
            .collect();

        if selected.len() < count as usize {
            return Err(AppError::PreconditionFailed(
                ErrorCode::InsufficientActiveLoans,
                format!(
                    "Not enough active borrows to return ({} requested, {} active)",
                    count,
                    selected.len()
                ),
            ));
        }

        if catalog.find(book_id).is_some() {
            catalog.check_adjustment(book_id, i64::from(count), self.rules.over_return_policy)?;
        }

        selected
            .into_iter()
            .map(|id| self.return_one(catalog, id, now))
            .collect()
    }

    /// All logs, most recently borrowed first
    pub fn list_all(&self) -> Vec<BorrowLog> {
        let mut logs: Vec<BorrowLog> = self.logs.values().rev().cloned().collect();
        logs.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at));
        logs
    }

    pub fn get(&self, log_id: Uuid) -> Option<&BorrowLog> {
        self.logs.get(&log_id)
    }

    /// Logs in issue order
    pub fn iter(&self) -> impl Iterator<Item = &BorrowLog> {
        self.logs.values()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn has_active_loans(&self, borrower_id: Uuid) -> bool {
        self.logs
            .values()
            .any(|l| l.borrower_id == borrower_id && l.is_active())
    }

    pub fn active_count(&self, book_id: &str) -> usize {
        self.logs
            .values()
            .filter(|l| l.book_id == book_id && l.is_active())
            .count()
    }

    /// A borrower's logs in issue order
    pub fn logs_for_borrower(&self, borrower_id: Uuid) -> Vec<BorrowLog> {
        self.logs
            .values()
            .filter(|l| l.borrower_id == borrower_id)
            .cloned()
            .collect()
    }

    fn loan_period(loan_days: u32) -> AppResult<Duration> {
        if loan_days < 1 {
            return Err(AppError::InvalidArgument(
                ErrorCode::InvalidLoanPeriod,
                "Loan period must be at least one day".to_string(),
            ));
        }
        Ok(Duration::days(i64::from(loan_days)))
    }

    fn check_borrower(&self, directory: &Directory, borrower_id: Uuid) -> AppResult<()> {
        if self.rules.require_registered_borrower && !directory.contains(borrower_id) {
            return Err(AppError::borrower_not_found(borrower_id));
        }
        Ok(())
    }

    fn issue(
        &mut self,
        borrower_id: Uuid,
        book_id: &str,
        loan_period: Duration,
        now: DateTime<Utc>,
    ) -> BorrowLog {
        let log = BorrowLog {
            id: Uuid::new_v4(),
            borrower_id,
            book_id: book_id.to_string(),
            borrowed_at: now,
            due_at: now + loan_period,
            returned_at: None,
        };
        self.logs.insert(log.id, log.clone());
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{book::CreateBook, borrower::RegisterBorrower};
    use tokio_test::{assert_err, assert_ok};

    struct Fixture {
        catalog: Catalog,
        directory: Directory,
        ledger: Ledger,
        alice: Uuid,
        bob: Uuid,
    }

    fn register(directory: &mut Directory, username: &str) -> Uuid {
        directory
            .register(
                RegisterBorrower {
                    name: username.to_string(),
                    member_id: format!("m-{}", username),
                    username: username.to_string(),
                    password: "p".to_string(),
                    email: format!("{}@x.com", username),
                    phone: None,
                },
                "p".to_string(),
                Utc::now(),
            )
            .unwrap()
            .id
    }

    fn fixture_with(rules: LendingRules) -> Fixture {
        let mut catalog = Catalog::new();
        for (id, total) in [("X", 2), ("Y", 3)] {
            catalog
                .add(CreateBook {
                    id: id.to_string(),
                    title: format!("Book {}", id),
                    author: "Author".to_string(),
                    categories: vec![],
                    total_copies: total,
                })
                .unwrap();
        }
        let mut directory = Directory::new();
        let alice = register(&mut directory, "alice");
        let bob = register(&mut directory, "bob");

        Fixture {
            catalog,
            directory,
            ledger: Ledger::new(rules),
            alice,
            bob,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(LendingRules::default())
    }

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    fn available(f: &Fixture, id: &str) -> u32 {
        f.catalog.find(id).unwrap().available_copies
    }

    impl Fixture {
        fn borrow_one(&mut self, borrower: Uuid, book: &str, now: DateTime<Utc>) -> AppResult<BorrowLog> {
            self.ledger
                .borrow_one(&mut self.catalog, &self.directory, borrower, book, 14, now)
        }

        fn borrow_many(
            &mut self,
            borrower: Uuid,
            book: &str,
            count: u32,
            now: DateTime<Utc>,
        ) -> AppResult<Vec<BorrowLog>> {
            self.ledger
                .borrow_many(&mut self.catalog, &self.directory, borrower, book, count, 14, now)
        }

        fn return_many(
            &mut self,
            borrower: Uuid,
            book: &str,
            count: u32,
            now: DateTime<Utc>,
        ) -> AppResult<Vec<BorrowLog>> {
            self.ledger
                .return_many(&mut self.catalog, borrower, book, count, now)
        }
    }

    #[test]
    fn test_borrow_one_sets_due_date() {
        let mut f = fixture();
        let log = f.borrow_one(f.alice, "X", at(0)).unwrap();

        assert_eq!(log.borrower_id, f.alice);
        assert_eq!(log.book_id, "X");
        assert_eq!(log.borrowed_at, at(0));
        assert_eq!(log.due_at, at(0) + Duration::days(14));
        assert!(log.is_active());
        assert_eq!(available(&f, "X"), 1);
    }

    #[test]
    fn test_borrow_one_custom_period() {
        let mut f = fixture();
        let log = f
            .ledger
            .borrow_one(&mut f.catalog, &f.directory, f.alice, "X", 3, at(0))
            .unwrap();
        assert_eq!(log.due_at, at(0) + Duration::days(3));

        let err = f
            .ledger
            .borrow_one(&mut f.catalog, &f.directory, f.alice, "X", 0, at(0))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLoanPeriod);
        assert_eq!(available(&f, "X"), 1);
    }

    #[test]
    fn test_borrow_one_unknown_book() {
        let mut f = fixture();
        let err = f.borrow_one(f.alice, "nope", at(0)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(ErrorCode::BookNotFound, _)));
        assert!(f.ledger.is_empty());
    }

    #[test]
    fn test_borrow_requires_registered_borrower() {
        let mut f = fixture();
        let stranger = Uuid::new_v4();
        let err = f.borrow_one(stranger, "X", at(0)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BorrowerNotFound);
        assert_eq!(available(&f, "X"), 2);

        let mut permissive = fixture_with(LendingRules {
            require_registered_borrower: false,
            ..LendingRules::default()
        });
        assert_ok!(permissive.borrow_one(stranger, "X", at(0)));
    }

    #[test]
    fn test_lending_scenario() {
        let mut f = fixture();

        let logs = f.borrow_many(f.alice, "X", 2, at(0)).unwrap();
        assert_eq!(logs.len(), 2);
        assert_ne!(logs[0].id, logs[1].id);
        assert!(logs.iter().all(BorrowLog::is_active));
        assert_eq!(available(&f, "X"), 0);

        let err = f.borrow_one(f.alice, "X", at(1)).unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(ErrorCode::BookUnavailable, _)));

        let returned = f.return_many(f.alice, "X", 1, at(2)).unwrap();
        assert_eq!(returned.len(), 1);
        assert_eq!(returned[0].returned_at, Some(at(2)));
        assert_eq!(available(&f, "X"), 1);
    }

    #[test]
    fn test_borrow_many_is_all_or_nothing() {
        let mut f = fixture();

        let err = f.borrow_many(f.alice, "X", 3, at(0)).unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(ErrorCode::InsufficientCopies, _)));
        assert!(f.ledger.is_empty());
        assert_eq!(available(&f, "X"), 2);

        let err = f.borrow_many(f.alice, "X", 0, at(0)).unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(ErrorCode::InvalidCount, _)));
        assert!(f.ledger.is_empty());

        let err = f.borrow_many(f.alice, "missing", 1, at(0)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::BookNotFound);
    }

    #[test]
    fn test_return_one_is_idempotent() {
        let mut f = fixture();
        let log = f.borrow_one(f.alice, "X", at(0)).unwrap();

        let first = f.ledger.return_one(&mut f.catalog, log.id, at(5)).unwrap();
        assert_eq!(first.returned_at, Some(at(5)));
        assert_eq!(available(&f, "X"), 2);

        let second = f.ledger.return_one(&mut f.catalog, log.id, at(9)).unwrap();
        assert_eq!(second, first);
        assert_eq!(available(&f, "X"), 2);
    }

    #[test]
    fn test_return_one_unknown_log() {
        let mut f = fixture();
        let err = f
            .ledger
            .return_one(&mut f.catalog, Uuid::new_v4(), at(0))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ErrorCode::LogNotFound, _)));
    }

    #[test]
    fn test_return_many_selects_oldest_of_pair() {
        let mut f = fixture();
        let first = f.borrow_one(f.alice, "Y", at(0)).unwrap();
        let other_book = f.borrow_one(f.alice, "X", at(1)).unwrap();
        let other_borrower = f.borrow_one(f.bob, "Y", at(2)).unwrap();
        let second = f.borrow_one(f.alice, "Y", at(3)).unwrap();
        let third = f.borrow_one(f.alice, "Y", at(4)).unwrap_err();
        assert_eq!(third.code(), ErrorCode::BookUnavailable);

        let returned = f.return_many(f.alice, "Y", 1, at(10)).unwrap();
        assert_eq!(returned.len(), 1);
        assert_eq!(returned[0].id, first.id);

        assert!(f.ledger.get(second.id).unwrap().is_active());
        assert!(f.ledger.get(other_book.id).unwrap().is_active());
        assert!(f.ledger.get(other_borrower.id).unwrap().is_active());
        assert_eq!(available(&f, "Y"), 1);

        let returned = f.return_many(f.alice, "Y", 1, at(11)).unwrap();
        assert_eq!(returned[0].id, second.id);
    }

    #[test]
    fn test_return_many_insufficient_active() {
        let mut f = fixture();
        f.borrow_one(f.alice, "X", at(0)).unwrap();

        let err = f.return_many(f.alice, "X", 2, at(1)).unwrap_err();
        assert!(matches!(
            err,
            AppError::PreconditionFailed(ErrorCode::InsufficientActiveLoans, _)
        ));
        assert!(f.ledger.has_active_loans(f.alice));
        assert_eq!(available(&f, "X"), 1);

        assert_err!(f.return_many(f.alice, "X", 0, at(1)));
        assert_err!(f.return_many(f.bob, "X", 1, at(1)));
    }

    #[test]
    fn test_reject_policy_blocks_over_return() {
        let mut f = fixture_with(LendingRules {
            over_return_policy: OverReturnPolicy::Reject,
            ..LendingRules::default()
        });
        let logs = f.borrow_many(f.alice, "X", 2, at(0)).unwrap();

        // Simulate a counter that drifted upwards
        f.catalog
            .adjust_availability("X", 2, OverReturnPolicy::Reject)
            .unwrap();

        let err = f.return_many(f.alice, "X", 2, at(1)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AvailabilityOverflow);
        assert!(f.ledger.get(logs[0].id).unwrap().is_active());
        assert!(f.ledger.get(logs[1].id).unwrap().is_active());
    }

    #[test]
    fn test_clamp_policy_caps_at_total() {
        let mut f = fixture();
        let log = f.borrow_one(f.alice, "X", at(0)).unwrap();
        f.catalog
            .adjust_availability("X", 1, OverReturnPolicy::Clamp)
            .unwrap();

        assert_ok!(f.ledger.return_one(&mut f.catalog, log.id, at(1)));
        assert_eq!(available(&f, "X"), 2);
    }

    #[test]
    fn test_list_all_newest_first() {
        let mut f = fixture();
        let old = f.borrow_one(f.alice, "X", at(0)).unwrap();
        let batch = f.borrow_many(f.bob, "Y", 2, at(5)).unwrap();
        let mid = f.borrow_one(f.bob, "X", at(3)).unwrap();

        let ids: Vec<Uuid> = f.ledger.list_all().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![batch[1].id, batch[0].id, mid.id, old.id]);
    }

    #[test]
    fn test_availability_never_exceeds_bounds() {
        let mut f = fixture();
        let mut issued = Vec::new();

        for step in 0..20 {
            if step % 3 == 2 {
                if let Some(id) = issued.pop() {
                    f.ledger.return_one(&mut f.catalog, id, at(step)).unwrap();
                }
            } else if let Ok(log) = f.borrow_one(f.alice, "Y", at(step)) {
                issued.push(log.id);
            }

            let book = f.catalog.find("Y").unwrap();
            assert!(book.available_copies <= book.total_copies);
            assert_eq!(
                book.available_copies as usize,
                book.total_copies as usize - f.ledger.active_count("Y")
            );
        }
    }

    #[test]
    fn test_accessors() {
        let mut f = fixture();
        f.borrow_one(f.alice, "X", at(0)).unwrap();
        f.borrow_one(f.bob, "Y", at(1)).unwrap();

        assert!(f.ledger.has_active_loans(f.alice));
        assert_eq!(f.ledger.active_count("X"), 1);
        assert_eq!(f.ledger.logs_for_borrower(f.bob).len(), 1);
        assert_eq!(f.ledger.len(), 2);
        assert_eq!(f.ledger.iter().next().unwrap().borrower_id, f.alice);
    }
}
