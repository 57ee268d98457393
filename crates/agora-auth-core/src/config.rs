//! Configuration types for the auth service

use jsonwebtoken::Algorithm;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Auth configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("secret key too short: got {actual} bytes, need at least {minimum}")]
    SecretTooShort { actual: usize, minimum: usize },

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Auth service configuration
///
/// Built once at startup and handed to [`crate::AuthService`]; nothing in
/// this crate reads configuration from the environment.
#[derive(Clone)]
pub struct AuthConfig {
    secret_key: Arc<[u8]>,
    /// Access token signing algorithm (HMAC family only)
    pub algorithm: Algorithm,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh session lifetime
    pub refresh_token_ttl: Duration,
    /// Email verification session lifetime
    pub verification_ttl: Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Minimum secret length in bytes (256 bits)
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a config with default lifetimes, validating the secret
    pub fn try_new(secret_key: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let secret = secret_key.as_ref();
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                actual: secret.len(),
                minimum: Self::MIN_SECRET_LENGTH,
            });
        }

        Ok(Self {
            secret_key: Arc::from(secret),
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::from_secs(30 * 60), // 30 minutes
            refresh_token_ttl: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
            verification_ttl: Duration::from_secs(15 * 60), // 15 minutes
            bcrypt_cost: bcrypt::DEFAULT_COST,
        })
    }

    /// Signing secret
    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }

    /// Set the signing algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Result<Self, ConfigError> {
        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                self.algorithm = algorithm;
                Ok(self)
            }
            other => Err(ConfigError::UnsupportedAlgorithm(format!("{other:?}"))),
        }
    }

    /// Set access token lifetime
    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Set refresh session lifetime
    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    /// Set verification session lifetime
    pub fn with_verification_ttl(mut self, ttl: Duration) -> Self {
        self.verification_ttl = ttl;
        self
    }

    /// Set bcrypt cost
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

/// Parse an algorithm name such as `HS256`
pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::UnsupportedAlgorithm(name.to_string())),
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key_length", &self.secret_key.len())
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
