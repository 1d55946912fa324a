//! Borrower activity projections.
//!
//! Everything here is recomputed from the library state on each call; no
//! aggregate is cached.

use std::cmp::Ordering;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    collation,
    error::{AppError, AppResult},
    models::{
        activity::{AvailabilityDrift, BorrowerActivity, BorrowerBookDetail, BorrowerSummary},
        borrower::BorrowerView,
    },
    repository::{Library, Repository},
};

#[derive(Clone)]
pub struct ActivityService {
    repository: Repository,
}

impl ActivityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn summary_by_borrower(&self) -> AppResult<Vec<BorrowerSummary>> {
        self.repository.read(summary_by_borrower)
    }

    pub fn details_by_borrower_and_book(&self) -> AppResult<Vec<BorrowerBookDetail>> {
        self.repository.read(details_by_borrower_and_book)
    }

    pub fn borrower_activity(&self, borrower_id: Uuid) -> AppResult<BorrowerActivity> {
        self.repository
            .read(|library| borrower_activity(library, borrower_id))?
    }

    pub fn audit_availability(&self) -> AppResult<Vec<AvailabilityDrift>> {
        let drifts = self.repository.read(audit_availability)?;
        for drift in &drifts {
            tracing::warn!(
                book_id = %drift.book_id,
                recorded = drift.recorded_available,
                expected = drift.expected_available,
                "Availability counter drifted from ledger"
            );
        }
        Ok(drifts)
    }
}

/// One entry per borrower id with at least one log, busiest first
pub fn summary_by_borrower(library: &Library) -> Vec<BorrowerSummary> {
    let mut summaries: IndexMap<Uuid, BorrowerSummary> = IndexMap::new();

    for log in library.ledger.iter() {
        let entry = summaries
            .entry(log.borrower_id)
            .or_insert_with(|| BorrowerSummary {
                borrower_id: log.borrower_id,
                borrower: library.directory.get(log.borrower_id).map(BorrowerView::from),
                active_count: 0,
                total_count: 0,
                last_activity_at: log.borrowed_at,
            });
        entry.total_count += 1;
        if log.is_active() {
            entry.active_count += 1;
        }
        entry.last_activity_at = entry.last_activity_at.max(log.borrowed_at);
    }

    let mut summaries: Vec<BorrowerSummary> = summaries.into_values().collect();
    summaries.sort_by(|a, b| {
        b.active_count
            .cmp(&a.active_count)
            .then_with(|| b.last_activity_at.cmp(&a.last_activity_at))
    });
    summaries
}

/// Logs grouped per (borrower, book), split into active and returned
pub fn details_by_borrower_and_book(library: &Library) -> Vec<BorrowerBookDetail> {
    let mut groups: IndexMap<(Uuid, &str), BorrowerBookDetail> = IndexMap::new();

    for log in library.ledger.iter() {
        let entry = groups
            .entry((log.borrower_id, log.book_id.as_str()))
            .or_insert_with(|| BorrowerBookDetail {
                borrower_id: log.borrower_id,
                borrower_name: library.directory.get(log.borrower_id).map(|b| b.name.clone()),
                book_id: log.book_id.clone(),
                book_title: library.catalog.find(&log.book_id).map(|b| b.title.clone()),
                active_logs: Vec::new(),
                returned_logs: Vec::new(),
            });
        if log.is_active() {
            entry.active_logs.push(log.clone());
        } else {
            entry.returned_logs.push(log.clone());
        }
    }

    let mut details: Vec<BorrowerBookDetail> = groups.into_values().collect();
    details.sort_by(|a, b| {
        b.active_logs
            .len()
            .cmp(&a.active_logs.len())
            .then_with(|| compare_names(a.borrower_name.as_deref(), b.borrower_name.as_deref()))
    });
    details
}

// Unregistered borrowers sort as an empty name
fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    collation::compare(a.unwrap_or(""), b.unwrap_or(""))
}

pub fn borrower_activity(library: &Library, borrower_id: Uuid) -> AppResult<BorrowerActivity> {
    let borrower = library
        .directory
        .get(borrower_id)
        .ok_or_else(|| AppError::borrower_not_found(borrower_id))?;
    let history = library.ledger.logs_for_borrower(borrower_id);
    let active = history.iter().filter(|l| l.is_active()).cloned().collect();

    Ok(BorrowerActivity {
        borrower: BorrowerView::from(borrower),
        active,
        history,
    })
}

/// Books whose stored counter differs from `total - active loans`
pub fn audit_availability(library: &Library) -> Vec<AvailabilityDrift> {
    let mut drifts: Vec<AvailabilityDrift> = library
        .catalog
        .iter()
        .filter_map(|book| {
            let active = library.ledger.active_count(&book.id) as i64;
            let expected = i64::from(book.total_copies) - active;
            (expected != i64::from(book.available_copies)).then(|| AvailabilityDrift {
                book_id: book.id.clone(),
                recorded_available: book.available_copies,
                expected_available: expected,
            })
        })
        .collect();
    drifts.sort_by(|a, b| a.book_id.cmp(&b.book_id));
    drifts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::OverReturnPolicy,
        models::{book::CreateBook, borrower::RegisterBorrower},
    };
    use chrono::{DateTime, Duration, Utc};

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    fn register(library: &mut Library, name: &str) -> Uuid {
        library
            .directory
            .register(
                RegisterBorrower {
                    name: name.to_string(),
                    member_id: name.to_lowercase(),
                    username: name.to_lowercase(),
                    password: "p".to_string(),
                    email: format!("{}@x.com", name.to_lowercase()),
                    phone: None,
                },
                "p".to_string(),
                at(0),
            )
            .unwrap()
            .id
    }

    fn library() -> (Library, Uuid, Uuid) {
        let mut library = Library::default();
        for id in ["X", "Y"] {
            library
                .catalog
                .add(CreateBook {
                    id: id.to_string(),
                    title: format!("Title {}", id),
                    author: String::new(),
                    categories: vec![],
                    total_copies: 5,
                })
                .unwrap();
        }
        let zed = register(&mut library, "Zed");
        let amy = register(&mut library, "Amy");
        (library, zed, amy)
    }

    fn borrow(library: &mut Library, borrower: Uuid, book: &str, minutes: i64) -> Uuid {
        let Library {
            catalog,
            directory,
            ledger,
        } = library;
        ledger
            .borrow_one(catalog, directory, borrower, book, 14, at(minutes))
            .unwrap()
            .id
    }

    fn give_back(library: &mut Library, log_id: Uuid, minutes: i64) {
        let Library {
            catalog, ledger, ..
        } = library;
        ledger.return_one(catalog, log_id, at(minutes)).unwrap();
    }

    #[test]
    fn test_summary_orders_by_active_then_recency() {
        let (mut library, zed, amy) = library();
        let first = borrow(&mut library, zed, "X", 0);
        borrow(&mut library, amy, "X", 1);
        borrow(&mut library, zed, "Y", 2);
        give_back(&mut library, first, 3);

        let summaries = summary_by_borrower(&library);
        assert_eq!(summaries.len(), 2);

        // Both have one active loan; Zed borrowed most recently
        assert_eq!(summaries[0].borrower_id, zed);
        assert_eq!(summaries[0].active_count, 1);
        assert_eq!(summaries[0].total_count, 2);
        assert_eq!(summaries[0].last_activity_at, at(2));
        assert_eq!(summaries[1].borrower_id, amy);

        borrow(&mut library, amy, "Y", 4);
        let summaries = summary_by_borrower(&library);
        assert_eq!(summaries[0].borrower_id, amy);
        assert_eq!(summaries[0].active_count, 2);
        assert_eq!(summaries[0].borrower.as_ref().unwrap().name, "Amy");
    }

    #[test]
    fn test_summary_skips_borrowers_without_logs() {
        let (library, _, _) = library();
        assert!(summary_by_borrower(&library).is_empty());
    }

    #[test]
    fn test_details_grouping_and_order() {
        let (mut library, zed, amy) = library();
        let returned = borrow(&mut library, zed, "X", 0);
        borrow(&mut library, zed, "X", 1);
        borrow(&mut library, amy, "X", 2);
        borrow(&mut library, amy, "Y", 3);
        give_back(&mut library, returned, 4);

        let details = details_by_borrower_and_book(&library);
        assert_eq!(details.len(), 3);

        // All have one active loan, so names decide
        assert_eq!(details[0].borrower_name.as_deref(), Some("Amy"));
        assert_eq!(details[1].borrower_name.as_deref(), Some("Amy"));
        assert_eq!(details[2].borrower_id, zed);
        assert_eq!(details[2].active_logs.len(), 1);
        assert_eq!(details[2].returned_logs.len(), 1);
        assert_eq!(details[2].returned_logs[0].id, returned);
        assert_eq!(details[2].book_title.as_deref(), Some("Title X"));
    }

    #[test]
    fn test_borrower_activity() {
        let (mut library, zed, amy) = library();
        let log = borrow(&mut library, zed, "X", 0);
        borrow(&mut library, zed, "Y", 1);
        give_back(&mut library, log, 2);

        let activity = borrower_activity(&library, zed).unwrap();
        assert_eq!(activity.history.len(), 2);
        assert_eq!(activity.active.len(), 1);
        assert_eq!(activity.active[0].book_id, "Y");

        assert!(borrower_activity(&library, amy).unwrap().history.is_empty());
        assert!(borrower_activity(&library, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_audit_detects_drift() {
        let (mut library, zed, _) = library();
        borrow(&mut library, zed, "X", 0);
        assert!(audit_availability(&library).is_empty());

        library
            .catalog
            .adjust_availability("Y", -1, OverReturnPolicy::Clamp)
            .unwrap();
        let drifts = audit_availability(&library);
        assert_eq!(
            drifts,
            vec![AvailabilityDrift {
                book_id: "Y".to_string(),
                recorded_available: 4,
                expected_available: 5,
            }]
        );
    }

    #[test]
    fn test_service_reads_shared_state() {
        let repository = Repository::default();
        let service = ActivityService::new(repository.clone());
        assert!(service.summary_by_borrower().unwrap().is_empty());
        assert!(service.details_by_borrower_and_book().unwrap().is_empty());
        assert!(service.audit_availability().unwrap().is_empty());
        assert!(service.borrower_activity(Uuid::new_v4()).is_err());
    }
}
