/// Password Hashing and Verification
///
/// One-way bcrypt hashing. Plaintext passwords only pass through here and
/// are never stored or logged.

use bcrypt::{hash, verify};

use crate::configuration::PasswordSettings;
use crate::error::{AppError, ValidationError};

const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt ignores bytes past 72

// Never matches a stored hash; only used to spend bcrypt time
const ABSENT_PASSWORD: &str = "absent-identity-placeholder";

#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    absent_hash: String,
}

impl PasswordHasher {
    pub fn new(settings: &PasswordSettings) -> Self {
        let absent_hash = hash(ABSENT_PASSWORD, settings.hash_cost).unwrap_or_else(|e| {
            tracing::warn!("Could not prepare placeholder hash: {}", e);
            String::new()
        });

        Self {
            cost: settings.hash_cost,
            absent_hash,
        }
    }

    /// Hash a password using bcrypt
    ///
    /// # Errors
    /// Returns error if the password is empty or too long, or if bcrypt fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.is_empty() {
            return Err(ValidationError::EmptyField("password".to_string()).into());
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(
                ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH).into(),
            );
        }

        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    ///
    /// A stored hash bcrypt cannot parse verifies as `false`.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        match verify(password, password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Password verification failed: {}", e);
                false
            }
        }
    }

    /// Run a verification at the configured cost when there is no stored hash
    ///
    /// Keeps an unknown-email login as slow as a wrong-password one.
    pub fn verify_absent(&self, password: &str) -> bool {
        self.verify(password, &self.absent_hash)
    }
}
