//! Identity Lifecycle Service
//!
//! Core state-transition logic for the account lifecycle: registration
//! (including resurrection of soft-deleted accounts), verification, login
//! with precise failure classification, password-reset issuance, and
//! password-reset consumption.
//!
//! The service owns no durable state. Each operation is an independent
//! request that awaits the four capability interfaces (repository,
//! hashing, token issuance, mail) and returns a result or a typed failure.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::hashing::PasswordHasher;
use crate::mailer::Mailer;
use crate::models::*;
use crate::repository::AccountRepository;
use crate::token::TokenIssuer;

use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use validator::Validate;

/// Generate a single-use 6-digit reset code.
///
/// `thread_rng` is cryptographically secure; the numeric format and the
/// [100000, 999999] value space match what reset emails have always carried.
fn generate_reset_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Identity lifecycle service
pub struct IdentityService {
    repo: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    mailer: Arc<dyn Mailer>,
    config: AuthConfig,
}

impl IdentityService {
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        mailer: Arc<dyn Mailer>,
        config: AuthConfig,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            mailer,
            config,
        }
    }

    fn respond_with_tokens(&self, account: &Account) -> Result<AuthResponse, AuthError> {
        let access_token = self.tokens.create_access_token(account)?;
        let refresh_token = self.tokens.create_refresh_token(account)?;

        Ok(AuthResponse {
            account: account.into(),
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
        })
    }

    // ============================================
    // Registration
    // ============================================

    /// Register a new account, or resurrect a soft-deleted one.
    ///
    /// A soft-deleted account with the same email is reused: its name
    /// fields and password hash are overwritten, the provider reset to
    /// default, and the deletion marker cleared. This keeps the account id
    /// stable and avoids an email uniqueness conflict with the dead row.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        if self.repo.find_live_by_email(&req.email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let soft_deleted = self.repo.find_deleted_by_email(&req.email).await?;

        let password_hash = self.hasher.hash(&req.password)?;

        let account = match soft_deleted {
            Some(prior) => {
                // Resurrection. Any reset code the account carried before
                // deletion is left untouched.
                let account = self
                    .repo
                    .update(
                        prior.id,
                        AccountChanges {
                            firstname: Some(req.firstname),
                            lastname: Some(req.lastname),
                            password_hash: Some(password_hash),
                            provider: Some(AuthProvider::Default),
                            status: Some(AccountStatus::Active),
                            ..Default::default()
                        },
                    )
                    .await?;
                tracing::info!(account_id = %account.id, "Soft-deleted account resurrected");
                account
            }
            None => {
                // Registration does not gate on verification: accounts are
                // created active with no activation code.
                let account = self
                    .repo
                    .insert(NewAccount {
                        email: req.email,
                        password_hash,
                        firstname: req.firstname,
                        lastname: req.lastname,
                        provider: AuthProvider::Default,
                        status: AccountStatus::Active,
                    })
                    .await?;
                tracing::info!(account_id = %account.id, "Account registered");
                account
            }
        };

        self.respond_with_tokens(&account)
    }

    // ============================================
    // Verification
    // ============================================

    /// Consume an activation code and activate the account.
    ///
    /// Activation codes carry no expiry. The lookup matches email plus
    /// code only; the prior activation state does not matter.
    pub async fn verify_account(&self, req: VerifyAccountRequest) -> Result<(), AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let account = self
            .repo
            .find_by_activation_code(&req.email, &req.activation_code)
            .await?
            .ok_or(AuthError::InvalidActivationCode)?;

        self.repo
            .update(
                account.id,
                AccountChanges {
                    status: Some(AccountStatus::Active),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(account_id = %account.id, "Account verified");
        Ok(())
    }

    // ============================================
    // Login
    // ============================================

    /// Authenticate an account and issue tokens.
    ///
    /// When no active live account matches, the failure is classified so
    /// the caller can show a precise message: deleted account, not yet
    /// activated, or unknown email. This intentionally discloses account
    /// existence in exchange for precise user-facing messaging.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let account = match self.repo.find_active_by_email(&req.email).await? {
            Some(account) => account,
            None => {
                if self.repo.find_deleted_by_email(&req.email).await?.is_some() {
                    return Err(AuthError::AccountDeleted);
                }
                if self.repo.find_inactive_by_email(&req.email).await?.is_some() {
                    return Err(AuthError::AccountNotActivated);
                }
                return Err(AuthError::UserNotFound);
            }
        };

        if !self.hasher.verify(&req.password, &account.password_hash)? {
            return Err(AuthError::InvalidPassword);
        }

        tracing::info!(account_id = %account.id, "Account logged in");
        self.respond_with_tokens(&account)
    }

    // ============================================
    // Forgot Password
    // ============================================

    /// Issue a single-use, time-bounded password reset code.
    ///
    /// The code is persisted before the email is dispatched; a dispatch
    /// failure is logged and swallowed so the issued code stays valid.
    pub async fn forgot_password(&self, req: ForgotPasswordRequest) -> Result<(), AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let account = self
            .repo
            .find_active_by_email(&req.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let code = generate_reset_code();
        let expires_at = Utc::now() + Duration::minutes(self.config.password_reset_minutes);

        self.repo
            .update(
                account.id,
                AccountChanges {
                    pending_reset: Some(Some(PendingReset {
                        code: code.clone(),
                        expires_at,
                    })),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(account_id = %account.id, "Password reset code issued");

        if let Err(err) = self
            .mailer
            .send_forgot_password(&account.email, &code, expires_at)
            .await
        {
            tracing::warn!(
                account_id = %account.id,
                error = %err,
                "Failed to send password reset email"
            );
        }

        Ok(())
    }

    // ============================================
    // Reset Password
    // ============================================

    /// Consume a reset code and set a new password.
    ///
    /// An expired code is cleared as a side effect of detecting expiry, so
    /// a retry with the same code reports it as invalid rather than
    /// expired.
    pub async fn reset_password(&self, req: ResetPasswordRequest) -> Result<(), AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let account = self
            .repo
            .find_active_by_reset_code(&req.email, &req.reset_code)
            .await?
            .ok_or(AuthError::InvalidResetCode)?;

        let now = Utc::now();
        let live = matches!(&account.pending_reset, Some(reset) if !reset.is_expired(now));
        if !live {
            self.repo
                .update(
                    account.id,
                    AccountChanges {
                        pending_reset: Some(None),
                        ..Default::default()
                    },
                )
                .await?;
            return Err(AuthError::ResetCodeExpired);
        }

        let password_hash = self.hasher.hash(&req.new_password)?;

        self.repo
            .update(
                account.id,
                AccountChanges {
                    password_hash: Some(password_hash),
                    pending_reset: Some(None),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(account_id = %account.id, "Password reset completed");
        Ok(())
    }
}
