/// JWT Token Generation and Validation
///
/// `TokenCodec` signs and verifies HS256 access tokens with the process-wide
/// secret. It holds no mutable state and is shared freely across workers.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::auth::clock::Clock;
use crate::configuration::JwtSettings;
use crate::error::{AppError, TokenError};

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    pub fn new(config: &JwtSettings, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        // Expiry is checked against our own clock in `validate`
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_token_ttl: Duration::seconds(config.access_token_expiry),
            clock,
        }
    }

    /// Issue a signed token for `subject` that expires `ttl` from now
    ///
    /// # Errors
    /// Returns error if token encoding fails
    pub fn issue(&self, subject: &str, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let claims = Claims::new(subject, user_id, self.clock.now(), ttl, &self.issuer);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Issue a token with the configured access-token lifetime
    pub fn issue_access_token(&self, subject: &str, user_id: Uuid) -> Result<String, AppError> {
        self.issue(subject, user_id, self.access_token_ttl)
    }

    /// Full validation: signature, issuer, expiry, then subject
    pub fn validate(&self, token: &str, expected_subject: &str) -> Result<Claims, TokenError> {
        let claims = self.decode_verified(token)?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }
        if claims.sub != expected_subject {
            return Err(TokenError::SubjectMismatch);
        }

        Ok(claims)
    }

    /// Best-effort subject lookup that ignores expiry
    ///
    /// The signature is still verified, so a forged token yields `None`.
    pub fn extract_subject(&self, token: &str) -> Option<String> {
        self.decode_verified(token).ok().map(|claims| claims.sub)
    }

    fn decode_verified(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT decode error: {}", e);
                TokenError::Malformed
            })
    }
}
