//! Data models for the lending ledger

pub mod activity;
pub mod book;
pub mod borrow_log;
pub mod borrower;

// Re-export commonly used types
pub use activity::{AvailabilityDrift, BorrowerActivity, BorrowerBookDetail, BorrowerSummary};
pub use book::{Book, BookQuery, CreateBook};
pub use borrow_log::BorrowLog;
pub use borrower::{Authenticated, Borrower, BorrowerView, Principal, RegisterBorrower, Role};
