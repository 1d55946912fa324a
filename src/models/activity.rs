//! Read-only activity projections

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{borrow_log::BorrowLog, borrower::BorrowerView};

/// Per-borrower loan counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowerSummary {
    pub borrower_id: Uuid,
    /// Absent when the id is not registered
    pub borrower: Option<BorrowerView>,
    pub active_count: usize,
    pub total_count: usize,
    pub last_activity_at: DateTime<Utc>,
}

/// Loans grouped by (borrower, book)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowerBookDetail {
    pub borrower_id: Uuid,
    pub borrower_name: Option<String>,
    pub book_id: String,
    pub book_title: Option<String>,
    pub active_logs: Vec<BorrowLog>,
    pub returned_logs: Vec<BorrowLog>,
}

/// Everything one borrower has borrowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowerActivity {
    pub borrower: BorrowerView,
    pub active: Vec<BorrowLog>,
    pub history: Vec<BorrowLog>,
}

/// A book whose counter disagrees with its outstanding loans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AvailabilityDrift {
    pub book_id: String,
    pub recorded_available: u32,
    pub expected_available: i64,
}
