/// JWT Claims structure
///
/// Payload of an access token: the subject is the user's email, the user id
/// travels in its own claim.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// User ID
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID, unique per issued token
    pub jti: String,
}

impl Claims {
    /// Create claims valid from `now` for `ttl`
    pub fn new(
        subject: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
        ttl: Duration,
        issuer: &str,
    ) -> Self {
        let iat = now.timestamp();
        Self {
            sub: subject.to_string(),
            user_id,
            iat,
            exp: iat + ttl.num_seconds(),
            iss: issuer.to_string(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Expired only once `now` is strictly past `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
