//! Borrower directory: primary records plus case-insensitive email and
//! username indexes

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    collation,
    config::AdminConfig,
    credentials::CredentialVerifier,
    error::{AppError, AppResult, ErrorCode},
    models::borrower::{Authenticated, Borrower, BorrowerView, Principal, RegisterBorrower, Role},
};

#[derive(Debug, Default, Clone)]
pub struct Directory {
    borrowers: HashMap<Uuid, Borrower>,
    by_email: HashMap<String, Uuid>,
    by_username: HashMap<String, Uuid>,
}

/// A resolved login identifier awaiting its credential check
#[derive(Debug, Clone)]
pub enum LoginCandidate {
    /// The configured admin, already matched exactly
    Admin(String),
    Borrower(Borrower),
}

impl LoginCandidate {
    pub fn verify(self, verifier: &dyn CredentialVerifier, password: &str) -> Option<Authenticated> {
        match self {
            LoginCandidate::Admin(username) => Some(Authenticated {
                principal: Principal::Admin { username },
                role: Role::Admin,
            }),
            LoginCandidate::Borrower(borrower) => {
                if !verifier.verify(&borrower.password, password) {
                    return None;
                }
                let role = borrower.role;
                Some(Authenticated {
                    principal: Principal::Borrower(BorrowerView::from(borrower)),
                    role,
                })
            }
        }
    }
}

fn index_key(s: &str) -> String {
    s.to_lowercase()
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a borrower; `credential` is the already-sealed password
    pub fn register(
        &mut self,
        input: RegisterBorrower,
        credential: String,
        now: DateTime<Utc>,
    ) -> AppResult<Borrower> {
        let email_key = index_key(&input.email);
        let username_key = index_key(&input.username);

        if self.by_email.contains_key(&email_key) {
            return Err(AppError::Conflict(
                ErrorCode::DuplicateEmail,
                "Email already registered".to_string(),
            ));
        }
        if self.by_username.contains_key(&username_key) {
            return Err(AppError::Conflict(
                ErrorCode::DuplicateUsername,
                "Username already taken".to_string(),
            ));
        }

        let borrower = Borrower {
            id: Uuid::new_v4(),
            member_id: input.member_id,
            name: input.name,
            username: input.username,
            email: input.email,
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            registered_at: now,
            password: credential,
            role: Role::Borrower,
        };

        self.by_email.insert(email_key, borrower.id);
        self.by_username.insert(username_key, borrower.id);
        self.borrowers.insert(borrower.id, borrower.clone());
        Ok(borrower)
    }

    /// Resolve a login identifier to a principal.
    ///
    /// The configured admin is checked first with an exact match, then the
    /// username index, then the email index.
    pub fn authenticate(
        &self,
        admin: &AdminConfig,
        verifier: &dyn CredentialVerifier,
        identifier: &str,
        password: &str,
    ) -> Option<Authenticated> {
        self.resolve_login(admin, identifier, password)?
            .verify(verifier, password)
    }

    /// Look up who a login identifier refers to, without checking a
    /// borrower credential. The result owns its data so verification can
    /// happen after the library lock is released.
    pub fn resolve_login(
        &self,
        admin: &AdminConfig,
        identifier: &str,
        password: &str,
    ) -> Option<LoginCandidate> {
        if identifier == admin.username && password == admin.password {
            return Some(LoginCandidate::Admin(admin.username.clone()));
        }

        let key = index_key(identifier);
        let id = self
            .by_username
            .get(&key)
            .or_else(|| self.by_email.get(&key))?;
        self.borrowers
            .get(id)
            .cloned()
            .map(LoginCandidate::Borrower)
    }

    /// Remove a borrower and both of its index entries.
    ///
    /// `has_active_loans` is consulted before anything else; nothing changes
    /// on failure.
    pub fn remove(
        &mut self,
        id: Uuid,
        has_active_loans: impl FnOnce(Uuid) -> bool,
    ) -> AppResult<Borrower> {
        if has_active_loans(id) {
            return Err(AppError::PreconditionFailed(
                ErrorCode::BorrowerHasActiveLoans,
                "Borrower has active borrows".to_string(),
            ));
        }

        let borrower = self
            .borrowers
            .remove(&id)
            .ok_or_else(|| AppError::borrower_not_found(id))?;
        self.by_email.remove(&index_key(&borrower.email));
        self.by_username.remove(&index_key(&borrower.username));
        Ok(borrower)
    }

    pub fn get(&self, id: Uuid) -> Option<&Borrower> {
        self.borrowers.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.borrowers.contains_key(&id)
    }

    pub fn find_by_username(&self, username: &str) -> Option<&Borrower> {
        self.by_username
            .get(&index_key(username))
            .and_then(|id| self.borrowers.get(id))
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Borrower> {
        self.by_email
            .get(&index_key(email))
            .and_then(|id| self.borrowers.get(id))
    }

    pub fn len(&self) -> usize {
        self.borrowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borrowers.is_empty()
    }

    /// All borrowers ordered by display name
    pub fn list(&self) -> Vec<Borrower> {
        let mut borrowers: Vec<Borrower> = self.borrowers.values().cloned().collect();
        borrowers.sort_by(|a, b| {
            collation::compare(&a.name, &b.name).then_with(|| a.id.cmp(&b.id))
        });
        borrowers
    }
}
