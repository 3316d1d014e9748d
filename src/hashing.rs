//! Password Hashing Capability
//!
//! The service treats hashing as an opaque capability behind the
//! [`PasswordHasher`] trait; the default implementation is Argon2id.

use crate::config::AuthConfig;
use crate::error::AuthError;

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2, Params,
};

/// One-way password hashing and comparison.
///
/// Plaintext passwords must never be stored or logged by implementations.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into an opaque string.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Compare a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id password hasher with configurable cost parameters.
pub struct Argon2PasswordHasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Argon2PasswordHasher {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            memory_cost: config.argon2_memory_cost,
            time_cost: config.argon2_time_cost,
            parallelism: config.argon2_parallelism,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::Internal)?;

        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::Internal)?;

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
