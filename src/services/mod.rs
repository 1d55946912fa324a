//! Business logic services

pub mod activity;
pub mod borrowers;
pub mod catalog;
pub mod loans;

use std::sync::Arc;

use crate::{config::AppConfig, credentials, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub borrowers: borrowers::BorrowersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub activity: activity::ActivityService,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let verifier = credentials::from_scheme(config.auth.credential_scheme);
        Self::with_verifier(repository, config, verifier)
    }

    pub fn with_verifier(
        repository: Repository,
        config: &AppConfig,
        verifier: Arc<dyn credentials::CredentialVerifier>,
    ) -> Self {
        Self {
            borrowers: borrowers::BorrowersService::new(
                repository.clone(),
                verifier,
                config.admin.clone(),
            ),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.lending.default_loan_days),
            activity: activity::ActivityService::new(repository),
        }
    }
}
