//! Borrower model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Role tag attached to every authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Borrower,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Borrower => "borrower",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registered borrower, as stored in the directory.
///
/// `password` holds the sealed credential produced by the configured
/// `CredentialVerifier`. Never serialize this type to a client; use
/// [`BorrowerView`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Borrower {
    pub id: Uuid,
    pub member_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub password: String,
    pub role: Role,
}

/// Borrower with the credential stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BorrowerView {
    pub id: Uuid,
    pub member_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub role: Role,
}

impl From<&Borrower> for BorrowerView {
    fn from(b: &Borrower) -> Self {
        Self {
            id: b.id,
            member_id: b.member_id.clone(),
            name: b.name.clone(),
            username: b.username.clone(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            registered_at: b.registered_at,
            role: b.role,
        }
    }
}

impl From<Borrower> for BorrowerView {
    fn from(b: Borrower) -> Self {
        BorrowerView::from(&b)
    }
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterBorrower {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Member id is required"))]
    pub member_id: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
}

/// Who matched a successful authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    Admin { username: String },
    Borrower(BorrowerView),
}

/// Outcome of a successful credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub principal: Principal,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str) -> RegisterBorrower {
        RegisterBorrower {
            name: "Alice".to_string(),
            member_id: "m1".to_string(),
            username: "alice".to_string(),
            password: "p".to_string(),
            email: email.to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(request("a@x.com").validate().is_ok());
        assert!(request("not-an-email").validate().is_err());

        let mut missing = request("a@x.com");
        missing.member_id.clear();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_view_redacts_password() {
        let borrower = Borrower {
            id: Uuid::new_v4(),
            member_id: "m1".to_string(),
            name: "Alice".to_string(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            phone: None,
            registered_at: Utc::now(),
            password: "secret".to_string(),
            role: Role::Borrower,
        };

        let json = serde_json::to_value(BorrowerView::from(&borrower)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "borrower");
        assert_eq!(json["username"], "alice");
    }
}
