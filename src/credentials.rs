//! Credential sealing and verification.
//!
//! The directory never compares passwords itself; it stores whatever
//! [`CredentialVerifier::seal`] returns and asks [`CredentialVerifier::verify`]
//! at login time.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::CredentialScheme,
    error::{AppError, AppResult},
};

#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    /// Turn a presented password into the form stored on the borrower
    fn seal(&self, password: &str) -> AppResult<String>;

    /// Check a presented password against a stored credential
    fn verify(&self, stored: &str, presented: &str) -> bool;
}

/// Stores and compares passwords verbatim
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn seal(&self, password: &str) -> AppResult<String> {
        Ok(password.to_string())
    }

    fn verify(&self, stored: &str, presented: &str) -> bool {
        stored == presented
    }
}

/// Argon2id PHC strings with a random salt per credential
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Verifier;

impl CredentialVerifier for Argon2Verifier {
    fn seal(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, stored: &str, presented: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(presented.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored credential is not a valid PHC string: {}", e);
                false
            }
        }
    }
}

/// Build the verifier selected in configuration
pub fn from_scheme(scheme: CredentialScheme) -> Arc<dyn CredentialVerifier> {
    match scheme {
        CredentialScheme::Plaintext => Arc::new(PlaintextVerifier),
        CredentialScheme::Argon2 => Arc::new(Argon2Verifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_round_trip() {
        let verifier = PlaintextVerifier;
        let sealed = verifier.seal("p").unwrap();
        assert_eq!(sealed, "p");
        assert!(verifier.verify(&sealed, "p"));
        assert!(!verifier.verify(&sealed, "P"));
    }

    #[test]
    fn test_argon2_hides_password() {
        let verifier = Argon2Verifier;
        let sealed = verifier.seal("hunter2").unwrap();
        assert_ne!(sealed, "hunter2");
        assert!(sealed.starts_with("$argon2"));
        assert!(verifier.verify(&sealed, "hunter2"));
        assert!(!verifier.verify(&sealed, "hunter3"));
        assert!(!verifier.verify("not-a-hash", "hunter2"));
    }
}
