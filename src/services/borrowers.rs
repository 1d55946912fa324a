//! Borrower registration, authentication and removal

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AdminConfig,
    credentials::CredentialVerifier,
    error::{AppError, AppResult},
    models::borrower::{Authenticated, Borrower, RegisterBorrower},
    repository::{Library, Repository},
};

#[derive(Clone)]
pub struct BorrowersService {
    repository: Repository,
    verifier: Arc<dyn CredentialVerifier>,
    admin: AdminConfig,
}

impl BorrowersService {
    pub fn new(
        repository: Repository,
        verifier: Arc<dyn CredentialVerifier>,
        admin: AdminConfig,
    ) -> Self {
        Self {
            repository,
            verifier,
            admin,
        }
    }

    /// Register a new borrower
    pub fn register(&self, input: RegisterBorrower) -> AppResult<Borrower> {
        input.validate()?;
        let credential = self.verifier.seal(&input.password)?;

        let borrower = self
            .repository
            .write(|library| library.directory.register(input, credential, Utc::now()))?;

        tracing::info!(borrower_id = %borrower.id, username = %borrower.username, "Borrower registered");
        Ok(borrower)
    }

    /// Check credentials; `None` means no principal matched
    pub fn authenticate(&self, identifier: &str, password: &str) -> AppResult<Option<Authenticated>> {
        let candidate = self
            .repository
            .read(|library| library.directory.resolve_login(&self.admin, identifier, password))?;
        // Credential hashing can be slow; the library lock is already released here
        let result = candidate.and_then(|c| c.verify(self.verifier.as_ref(), password));

        match &result {
            Some(auth) => tracing::info!(role = %auth.role, "Login succeeded"),
            None => tracing::warn!(identifier = %identifier, "Login failed"),
        }
        Ok(result)
    }

    /// Remove a borrower without active loans
    pub fn remove(&self, id: Uuid) -> AppResult<Borrower> {
        let removed = self.repository.write(|library| {
            let Library {
                directory, ledger, ..
            } = library;
            directory.remove(id, |id| ledger.has_active_loans(id))
        })?;

        tracing::info!(borrower_id = %id, "Borrower removed");
        Ok(removed)
    }

    /// Get a borrower by ID
    pub fn get(&self, id: Uuid) -> AppResult<Borrower> {
        self.repository
            .read(|library| library.directory.get(id).cloned())?
            .ok_or_else(|| AppError::borrower_not_found(id))
    }

    /// List borrowers ordered by name
    pub fn list(&self) -> AppResult<Vec<Borrower>> {
        self.repository.read(|library| library.directory.list())
    }
}
