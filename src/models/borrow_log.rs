//! Borrow log (loan record) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One lent copy of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowLog {
    pub id: Uuid,
    pub borrower_id: Uuid,
    pub book_id: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    /// Absent while the loan is active; never cleared once set
    pub returned_at: Option<DateTime<Utc>>,
}

impl BorrowLog {
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.due_at < now
    }
}

/// Borrow request: omit `copies` to lend a single copy
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub borrower_id: Uuid,
    pub book_id: String,
    pub copies: Option<u32>,
    /// Loan period in days; the configured default applies when absent
    pub days: Option<u32>,
}

/// Batch return request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReturnManyRequest {
    pub borrower_id: Uuid,
    pub book_id: String,
    pub count: u32,
}
