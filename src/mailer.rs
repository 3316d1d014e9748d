//! Mail Dispatch Capability
//!
//! Outbound email behind the [`Mailer`] trait. The identity service treats
//! dispatch as fire-and-forget: a failure is reported but never rolls back
//! state the service already persisted.

use crate::error::AuthError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;

/// Dispatches templated identity emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the forgot-password email carrying the reset code and the
    /// expiry instant in epoch milliseconds.
    async fn send_forgot_password(
        &self,
        to: &str,
        reset_code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;
}

/// SMTP connection settings loaded from environment
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname (from SMTP_HOST env var)
    pub host: String,
    /// SMTP username (from SMTP_USERNAME env var)
    pub username: String,
    /// SMTP password or app-specific password (from SMTP_PASSWORD env var)
    pub password: String,
    /// Sender address (from SMTP_FROM env var, defaults to the username)
    pub from: String,
}

impl SmtpConfig {
    /// Load SMTP settings from environment variables
    ///
    /// # Panics
    /// Panics if SMTP_HOST, SMTP_USERNAME or SMTP_PASSWORD is not set
    pub fn from_env() -> Self {
        let username =
            env::var("SMTP_USERNAME").expect("SMTP_USERNAME environment variable must be set");
        Self {
            host: env::var("SMTP_HOST").expect("SMTP_HOST environment variable must be set"),
            password: env::var("SMTP_PASSWORD")
                .expect("SMTP_PASSWORD environment variable must be set"),
            from: env::var("SMTP_FROM").unwrap_or_else(|_| username.clone()),
            username,
        }
    }
}

/// SMTP mailer sending plain-text identity emails.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn send_email(&self, to: &str, subject: &str, body: String) -> Result<(), AuthError> {
        let email = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| AuthError::Mail(format!("Invalid sender address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AuthError::Mail(format!("Invalid recipient address: {}", e)))?)
            .subject(subject)
            .header(lettre::message::header::ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AuthError::Mail(format!("Failed to build email: {}", e)))?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let transport = SmtpTransport::relay(&self.config.host)
            .map_err(|e| AuthError::Mail(format!("Failed to connect to SMTP relay: {}", e)))?
            .credentials(creds)
            .build();

        transport
            .send(&email)
            .map(|_| ())
            .map_err(|e| AuthError::Mail(format!("Failed to send email: {}", e)))
    }
}

/// Render the forgot-password email body.
pub(crate) fn forgot_password_body(reset_code: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        "A password reset was requested for your account.\n\n\
         Your reset code: {}\n\n\
         The code expires at {} (epoch ms {}). If you did not request a \
         reset, you can ignore this email.",
        reset_code,
        expires_at.to_rfc3339(),
        expires_at.timestamp_millis(),
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_forgot_password(
        &self,
        to: &str,
        reset_code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        self.send_email(
            to,
            "Password reset requested",
            forgot_password_body(reset_code, expires_at),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forgot_password_body_carries_code_and_expiry() {
        let expires_at = Utc::now();
        let body = forgot_password_body("654321", expires_at);

        assert!(body.contains("654321"));
        assert!(body.contains(&expires_at.timestamp_millis().to_string()));
    }
}
