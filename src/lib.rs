//! Lending Ledger
//!
//! An in-memory book lending tracker: borrowers register, librarians manage
//! the catalog and the borrow/return lifecycle, and an admin reviews borrower
//! activity through a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod collation;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build a fresh store and the services over it
    pub fn new(config: AppConfig) -> Self {
        let repository = repository::Repository::new((&config.lending).into());
        let services = services::Services::new(repository, &config);
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
