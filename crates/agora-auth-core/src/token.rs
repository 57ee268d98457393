//! Access token signing and verification

use agora_types::UserId;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{AuthConfig, AuthError};

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,
}

impl AccessClaims {
    /// Parse the subject as a user id
    pub fn subject(&self) -> Result<UserId, AuthError> {
        UserId::parse(&self.sub).map_err(|_| AuthError::MalformedToken)
    }

    /// Whether the token is past its expiry at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }
}

/// Stateless access token codec
///
/// `verify` checks structure and signature only. An expired but otherwise
/// valid token decodes successfully; callers compare `exp` to the clock.
#[derive(Clone)]
pub struct TokenCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the auth config
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            header: Header::new(config.algorithm),
            encoding_key: EncodingKey::from_secret(config.secret_key()),
            decoding_key: DecodingKey::from_secret(config.secret_key()),
            validation,
            access_ttl: config.access_token_ttl,
        }
    }

    /// Access token lifetime
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issue an access token for `subject` expiring `access_ttl` after `now`
    pub fn issue_access_token(
        &self,
        subject: UserId,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let ttl = i64::try_from(self.access_ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = AccessClaims {
            sub: subject.to_string(),
            exp: now.timestamp().saturating_add(ttl),
        };

        encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "failed to sign access token");
            AuthError::Internal
        })
    }

    /// Verify signature and structure, returning the claims
    pub fn verify(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                tracing::debug!(error = %e, "access token rejected");
                AuthError::MalformedToken
            },
        )?;

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.header.alg)
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}
