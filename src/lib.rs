//! Account Identity & Credential Lifecycle Service
//!
//! Core identity system providing:
//! - Account registration with soft-delete resurrection
//! - Email verification via single-use activation codes
//! - Login with precise failure classification
//! - Password-reset issuance (time-bounded 6-digit codes) and consumption
//! - Argon2id password hashing
//! - JWT access and refresh token issuance
//!
//! The service depends on four capability interfaces supplied by the host
//! application: [`repository::AccountRepository`],
//! [`hashing::PasswordHasher`], [`token::TokenIssuer`] and
//! [`mailer::Mailer`]. Default implementations ship for all four
//! (Postgres, Argon2id, HS256 JWT, SMTP).
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ACCESS_EXPIRATION` - Access token expiration in seconds (default: 900)
//! - `JWT_REFRESH_EXPIRATION` - Refresh token expiration in seconds (default: 604800)
//! - `JWT_ISSUER` / `JWT_AUDIENCE` - JWT claims (defaults: "auth-core" / "auth-core-api")
//! - `PASSWORD_RESET_EXPIRES_IN` - Reset code lifetime, `<integer>m` format (default: "15m")
//! - `SMTP_HOST` / `SMTP_USERNAME` / `SMTP_PASSWORD` / `SMTP_FROM` - Mail dispatch
//!
//! # Usage
//!
//! ```rust,ignore
//! use auth_core::{AuthConfig, IdentityService};
//! use auth_core::hashing::Argon2PasswordHasher;
//! use auth_core::mailer::{SmtpConfig, SmtpMailer};
//! use auth_core::repository::PgAccountRepository;
//! use auth_core::token::JwtTokenIssuer;
//! use std::sync::Arc;
//!
//! let config = AuthConfig::from_env();
//! config.validate()?;
//!
//! PgAccountRepository::migrate(&pool).await?;
//! let service = IdentityService::new(
//!     Arc::new(PgAccountRepository::new(pool)),
//!     Arc::new(Argon2PasswordHasher::new(&config)),
//!     Arc::new(JwtTokenIssuer::new(config.clone())),
//!     Arc::new(SmtpMailer::new(SmtpConfig::from_env())),
//!     config,
//! );
//!
//! let response = service.register(register_request).await?;
//! ```

pub mod config;
pub mod error;
pub mod hashing;
pub mod mailer;
pub mod models;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::AuthError;
pub use hashing::{Argon2PasswordHasher, PasswordHasher};
pub use mailer::{Mailer, SmtpConfig, SmtpMailer};
pub use models::*;
pub use repository::{AccountRepository, PgAccountRepository};
pub use service::IdentityService;
pub use token::{JwtTokenIssuer, TokenIssuer};
