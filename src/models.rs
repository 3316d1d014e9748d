//! Identity Models
//!
//! Data structures for identity requests, responses, and the account entity.
//!
//! The account lifecycle is an explicit sum type rather than a bag of
//! nullable columns: an account is active, pending activation, or
//! soft-deleted, and a pending password reset is an orthogonal sub-state.
//! Combinations like "active and soft-deleted" are unrepresentable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ============================================
// Account Entity
// ============================================

/// Credential provider for an account.
///
/// This crate only handles `Default` (email + password); social providers
/// are carried through so a resurrected social account is reset correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_provider", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Default,
    Google,
    Facebook,
}

/// Lifecycle state of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AccountStatus {
    /// Verified (or created directly active) and able to log in.
    Active,
    /// Not yet verified. Usually holds a single-use activation code (no
    /// expiry is enforced on it); an account deactivated out-of-band may
    /// carry none.
    PendingActivation { activation_code: Option<String> },
    /// Marked deleted but retained in storage with its id and history.
    SoftDeleted { deleted_at: DateTime<Utc> },
}

/// A pending password reset: single-use code plus its expiry instant.
///
/// Code and expiry always travel together; clearing the reset clears both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReset {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl PendingReset {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// The account entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub provider: AuthProvider,
    pub status: AccountStatus,
    pub pending_reset: Option<PendingReset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }

    pub fn is_soft_deleted(&self) -> bool {
        matches!(self.status, AccountStatus::SoftDeleted { .. })
    }

    /// Activation code if the account is still pending verification.
    pub fn activation_code(&self) -> Option<&str> {
        match &self.status {
            AccountStatus::PendingActivation { activation_code } => activation_code.as_deref(),
            _ => None,
        }
    }
}

/// Fields for inserting a brand-new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub provider: AuthProvider,
    pub status: AccountStatus,
}

/// Partial update of an account record.
///
/// `None` leaves a field untouched. `pending_reset` is doubly optional so
/// that clearing the reset (`Some(None)`) is distinct from not touching it.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub password_hash: Option<String>,
    pub provider: Option<AuthProvider>,
    pub status: Option<AccountStatus>,
    pub pending_reset: Option<Option<PendingReset>>,
}

impl AccountChanges {
    /// Apply this change set to an account in place, bumping `updated_at`.
    pub fn apply(self, account: &mut Account, now: DateTime<Utc>) {
        if let Some(firstname) = self.firstname {
            account.firstname = firstname;
        }
        if let Some(lastname) = self.lastname {
            account.lastname = lastname;
        }
        if let Some(password_hash) = self.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(provider) = self.provider {
            account.provider = provider;
        }
        if let Some(status) = self.status {
            account.status = status;
        }
        if let Some(pending_reset) = self.pending_reset {
            account.pending_reset = pending_reset;
        }
        account.updated_at = now;
    }
}

// ============================================
// Request DTOs
// ============================================

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub firstname: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub lastname: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Account verification request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyAccountRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Activation code is required"))]
    pub activation_code: String,
}

/// Password reset request (initiate)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset request (complete)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Reset code is required"))]
    pub reset_code: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

// ============================================
// Response DTOs
// ============================================

/// Public account data without sensitive fields
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub provider: AuthProvider,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            firstname: account.firstname.clone(),
            lastname: account.lastname.clone(),
            provider: account.provider,
            created_at: account.created_at,
        }
    }
}

/// Authentication response with tokens
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

// ============================================
// JWT Claims
// ============================================

/// JWT claims for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (account ID)
    pub sub: Uuid,
    /// Account email
    pub email: String,
    /// First name
    pub firstname: String,
    /// Last name
    pub lastname: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// JWT ID (unique identifier)
    pub jti: Uuid,
}

/// JWT claims for refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (account ID)
    pub sub: Uuid,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID (unique identifier)
    pub jti: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn account(status: AccountStatus) -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            password_hash: "hash".into(),
            firstname: "Alice".into(),
            lastname: "Smith".into(),
            provider: AuthProvider::Default,
            status,
            pending_reset: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_helpers() {
        assert!(account(AccountStatus::Active).is_active());
        assert!(!account(AccountStatus::Active).is_soft_deleted());

        let deleted = account(AccountStatus::SoftDeleted {
            deleted_at: Utc::now(),
        });
        assert!(deleted.is_soft_deleted());
        assert!(!deleted.is_active());

        let pending = account(AccountStatus::PendingActivation {
            activation_code: Some("123456".into()),
        });
        assert_eq!(pending.activation_code(), Some("123456"));
        assert_eq!(account(AccountStatus::Active).activation_code(), None);

        let deactivated = account(AccountStatus::PendingActivation {
            activation_code: None,
        });
        assert_eq!(deactivated.activation_code(), None);
        assert!(!deactivated.is_active());
    }

    #[test]
    fn test_pending_reset_expiry() {
        let now = Utc::now();
        let live = PendingReset {
            code: "654321".into(),
            expires_at: now + Duration::minutes(15),
        };
        assert!(!live.is_expired(now));

        let stale = PendingReset {
            code: "654321".into(),
            expires_at: now - Duration::seconds(1),
        };
        assert!(stale.is_expired(now));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let account = account(AccountStatus::Active);
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("hash"));
    }
}
