//! Identity Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;

/// Default reset-code lifetime when PASSWORD_RESET_EXPIRES_IN is unset or malformed.
const DEFAULT_RESET_EXPIRES_IN: &str = "15m";

/// Identity service configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// JWT access token expiration in seconds (from JWT_ACCESS_EXPIRATION env var)
    pub access_token_expiration: i64,

    /// JWT refresh token expiration in seconds (from JWT_REFRESH_EXPIRATION env var)
    pub refresh_token_expiration: i64,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Password reset code lifetime in minutes, parsed from the textual
    /// `<integer>m` format (from PASSWORD_RESET_EXPIRES_IN env var, default "15m")
    pub password_reset_minutes: i64,
}

/// Parse a duration in the `<integer>m` format ("15m" -> 15 minutes).
pub(crate) fn parse_minutes(value: &str) -> Option<i64> {
    let digits = value.strip_suffix('m')?;
    digits.parse::<i64>().ok().filter(|m| *m > 0)
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// # Panics
    /// Panics if JWT_SECRET environment variable is not set
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET environment variable must be set"),

            access_token_expiration: env::var("JWT_ACCESS_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900), // 15 minutes default

            refresh_token_expiration: env::var("JWT_REFRESH_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(604800), // 7 days default

            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "auth-core".to_string()),

            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "auth-core-api".to_string()),

            argon2_memory_cost: env::var("ARGON2_MEMORY_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(65536), // 64 MiB

            argon2_time_cost: env::var("ARGON2_TIME_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            argon2_parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),

            password_reset_minutes: env::var("PASSWORD_RESET_EXPIRES_IN")
                .ok()
                .as_deref()
                .and_then(parse_minutes)
                .unwrap_or_else(|| {
                    parse_minutes(DEFAULT_RESET_EXPIRES_IN)
                        .expect("default reset lifetime is well-formed")
                }),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(AuthError::Config(
                "JWT_ACCESS_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.refresh_token_expiration <= self.access_token_expiration {
            return Err(AuthError::Config(
                "JWT_REFRESH_EXPIRATION must be greater than JWT_ACCESS_EXPIRATION".to_string(),
            ));
        }

        if self.password_reset_minutes <= 0 {
            return Err(AuthError::Config(
                "PASSWORD_RESET_EXPIRES_IN must be a positive number of minutes".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "a".repeat(32),
        access_token_expiration: 900,
        refresh_token_expiration: 604800,
        jwt_issuer: "test".to_string(),
        jwt_audience: "test".to_string(),
        // Minimal Argon2 cost so test hashing stays fast
        argon2_memory_cost: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        password_reset_minutes: 15,
    }
}
