//! Token Issuance Capability
//!
//! Access and refresh token creation behind the [`TokenIssuer`] trait.
//! Token contents and expiry policy are opaque to the identity service;
//! the default implementation signs HS256 JWTs.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::{AccessTokenClaims, Account, RefreshTokenClaims};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// Issues signed tokens for an account.
pub trait TokenIssuer: Send + Sync {
    fn create_access_token(&self, account: &Account) -> Result<String, AuthError>;
    fn create_refresh_token(&self, account: &Account) -> Result<String, AuthError>;
}

/// JWT token issuer using an HS256 shared secret.
pub struct JwtTokenIssuer {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenIssuer {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Validate an access token and return its claims.
    ///
    /// Host applications use this to authenticate requests carrying tokens
    /// issued by this service.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn create_access_token(&self, account: &Account) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_expiration);

        let claims = AccessTokenClaims {
            sub: account.id,
            email: account.email.clone(),
            firstname: account.firstname.clone(),
            lastname: account.lastname.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    fn create_refresh_token(&self, account: &Account) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.refresh_token_expiration);

        let claims = RefreshTokenClaims {
            sub: account.id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::models::{AccountStatus, AuthProvider};

    fn account() -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            email: "alice@example.com".into(),
            password_hash: "hash".into(),
            firstname: "Alice".into(),
            lastname: "Smith".into(),
            provider: AuthProvider::Default,
            status: AccountStatus::Active,
            pending_reset: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let issuer = JwtTokenIssuer::new(test_config());
        let account = account();

        let token = issuer.create_access_token(&account).unwrap();
        assert!(!token.is_empty());

        let claims = issuer.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.firstname, "Alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_is_issued() {
        let issuer = JwtTokenIssuer::new(test_config());
        let token = issuer.create_refresh_token(&account()).unwrap();
        assert!(!token.is_empty());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let issuer = JwtTokenIssuer::new(test_config());
        let mut token = issuer.create_access_token(&account()).unwrap();
        token.push('x');
        assert!(issuer.validate_access_token(&token).is_err());
    }
}
