//! Repository layer: the in-memory library state.
//!
//! Catalog, directory and ledger live together in one [`Library`] guarded by
//! a single mutex, so every operation (batches included) is applied as one
//! unit and cross-component invariants are never observable mid-change.

pub mod catalog;
pub mod directory;
pub mod ledger;

use std::sync::{Arc, Mutex, MutexGuard};
#[cfg(test)]
use std::sync::TryLockError;

use crate::error::{AppError, AppResult};

pub use catalog::Catalog;
pub use directory::{Directory, LoginCandidate};
pub use ledger::{Ledger, LendingRules};

/// The complete lending state
#[derive(Debug, Default, Clone)]
pub struct Library {
    pub catalog: Catalog,
    pub directory: Directory,
    pub ledger: Ledger,
}

impl Library {
    pub fn new(rules: LendingRules) -> Self {
        Self {
            catalog: Catalog::new(),
            directory: Directory::new(),
            ledger: Ledger::new(rules),
        }
    }
}

/// Shared handle to the library state
#[derive(Clone)]
pub struct Repository {
    library: Arc<Mutex<Library>>,
}

impl Repository {
    /// Create an empty store with the given lending rules
    pub fn new(rules: LendingRules) -> Self {
        Self {
            library: Arc::new(Mutex::new(Library::new(rules))),
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Library>> {
        self.library
            .lock()
            .map_err(|_| AppError::Internal("Library state lock poisoned".to_string()))
    }

    /// Run a read-only projection
    pub fn read<T>(&self, f: impl FnOnce(&Library) -> T) -> AppResult<T> {
        let library = self.lock()?;
        Ok(f(&library))
    }

    /// Run a mutation; the lock is held for the whole closure
    pub fn write<T>(&self, f: impl FnOnce(&mut Library) -> AppResult<T>) -> AppResult<T> {
        let mut library = self.lock()?;
        f(&mut library)
    }

    /// Whether some caller currently holds the library lock
    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        matches!(self.library.try_lock(), Err(TryLockError::WouldBlock))
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new(LendingRules::default())
    }
}
