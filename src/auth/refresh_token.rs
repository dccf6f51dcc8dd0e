/// Refresh Token Management
///
/// Refresh tokens are:
/// - Cryptographically secure random 64-character strings
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - One live record per user; a new login replaces the previous record
/// - Not rotated on refresh; removed on logout or when found expired

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::clock::Clock;
use crate::configuration::JwtSettings;
use crate::error::RefreshTokenError;

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Server-side lifecycle of refresh tokens
///
/// Implementations must make the three operations mutually exclusive.
pub trait RefreshTokenStore: Send + Sync {
    /// Mint a token for `user_id`, replacing any record the user already has
    fn create(&self, user_id: Uuid, remember_me: bool) -> String;

    /// Resolve a token to its user without consuming it
    ///
    /// An expired record is deleted as it is found.
    fn verify_and_resolve_user(&self, token: &str) -> Result<Uuid, RefreshTokenError>;

    /// Remove the record holding `token`; unknown tokens are ignored
    fn invalidate(&self, token: &str);
}

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Generate a new cryptographically secure refresh token
///
/// 64 base62 characters, roughly 380 bits of entropy.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a refresh token using SHA-256
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mutex-guarded map of refresh records keyed by user id
pub struct InMemoryRefreshTokenStore {
    records: Mutex<HashMap<Uuid, RefreshTokenRecord>>,
    ttl: Duration,
    remember_me_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryRefreshTokenStore {
    pub fn new(config: &JwtSettings, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::seconds(config.refresh_token_expiry);
        Self {
            records: Mutex::new(HashMap::new()),
            ttl,
            remember_me_ttl: ttl * config.remember_me_multiplier,
            clock,
        }
    }

    /// Number of stored records, live or not yet reaped
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every mutation completes under the lock, so a poisoned map is still consistent
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, RefreshTokenRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RefreshTokenStore for InMemoryRefreshTokenStore {
    fn create(&self, user_id: Uuid, remember_me: bool) -> String {
        let token = generate_refresh_token();
        let ttl = if remember_me { self.remember_me_ttl } else { self.ttl };
        let record = RefreshTokenRecord {
            user_id,
            token_hash: hash_token(&token),
            expires_at: self.clock.now() + ttl,
        };

        if self.lock().insert(user_id, record).is_some() {
            tracing::debug!(user_id = %user_id, "Replaced existing refresh token");
        }

        token
    }

    fn verify_and_resolve_user(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let token_hash = hash_token(token);
        let mut records = self.lock();

        let (user_id, expires_at) = records
            .values()
            .find(|record| record.token_hash == token_hash)
            .map(|record| (record.user_id, record.expires_at))
            .ok_or_else(|| {
                tracing::warn!("Refresh token not found");
                RefreshTokenError::NotFound
            })?;

        if self.clock.now() > expires_at {
            records.remove(&user_id);
            tracing::info!(user_id = %user_id, "Refresh token expired");
            return Err(RefreshTokenError::Expired);
        }

        Ok(user_id)
    }

    fn invalidate(&self, token: &str) {
        let token_hash = hash_token(token);
        self.lock().retain(|_, record| record.token_hash != token_hash);
    }
}
