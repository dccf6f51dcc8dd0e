/// Authentication Gate
///
/// Two protocols live here:
/// - `authenticate_header` runs once per request and turns an optional
///   `Authorization` header into `Authenticated` or `Anonymous`. It never
///   fails; token problems simply leave the request anonymous.
/// - `login`, `register`, `refresh` and `logout` are the credential exchange
///   behind the `/auth/*` endpoints and return typed errors.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::auth::jwt::TokenCodec;
use crate::auth::password::PasswordHasher;
use crate::auth::refresh_token::RefreshTokenStore;
use crate::auth::resolver::IdentityResolver;
use crate::error::{AppError, AuthError};
use crate::identity::{Identity, NewIdentity};
use crate::validators::{is_valid_age, is_valid_email, is_valid_name};

const BEARER_PREFIX: &str = "Bearer ";

/// Authority granted to every authenticated principal
pub const USER_ROLE: &str = "USER";

/// Identity attached to a single authenticated request
#[derive(Debug, Clone)]
pub struct AuthenticatedContext {
    pub identity: Identity,
    pub claims: Claims,
    pub role: &'static str,
}

#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authenticated(AuthenticatedContext),
    Anonymous,
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated(_))
    }
}

/// Access token plus, for login and registration, a refresh token
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Registration fields as submitted, before validation and hashing
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: u32,
}

pub struct AuthenticationGate {
    codec: TokenCodec,
    resolver: IdentityResolver,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    hasher: PasswordHasher,
}

impl AuthenticationGate {
    pub fn new(
        codec: TokenCodec,
        resolver: IdentityResolver,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            codec,
            resolver,
            refresh_tokens,
            hasher,
        }
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// Per-request token check
    pub fn authenticate_header(&self, authorization: Option<&str>) -> AuthOutcome {
        let token = match authorization.and_then(|h| h.strip_prefix(BEARER_PREFIX)) {
            Some(token) => token.trim(),
            None => return AuthOutcome::Anonymous,
        };

        let subject = match self.codec.extract_subject(token) {
            Some(subject) => subject,
            None => {
                tracing::debug!("Bearer token could not be decoded");
                return AuthOutcome::Anonymous;
            }
        };

        let identity = match self.resolver.resolve_subject(&subject) {
            Some(identity) => identity,
            None => {
                tracing::debug!("Bearer token subject has no identity");
                return AuthOutcome::Anonymous;
            }
        };

        match self
            .codec
            .validate(token, IdentityResolver::expected_subject(&identity))
        {
            Ok(claims) => {
                tracing::debug!(
                    user_id = %identity.id,
                    role = USER_ROLE,
                    expires_at = ?claims.expires_at(),
                    "Bearer token validated"
                );
                AuthOutcome::Authenticated(AuthenticatedContext {
                    identity,
                    claims,
                    role: USER_ROLE,
                })
            }
            Err(e) => {
                tracing::debug!(user_id = %identity.id, "Bearer token rejected: {}", e);
                AuthOutcome::Anonymous
            }
        }
    }

    /// Exchange email and password for a token pair
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown email and for a wrong password alike.
    /// An unknown email still pays for one bcrypt verification.
    pub fn login(&self, email: &str, password: &str, remember_me: bool) -> Result<TokenPair, AppError> {
        let identity = match self.resolver.store().find_by_email(email) {
            Ok(identity) => identity,
            Err(_) => {
                self.hasher.verify_absent(password);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.hasher.verify(password, &identity.password_hash) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.issue_pair(&identity, remember_me)?;
        tracing::info!(user_id = %identity.id, remember_me, "User logged in");
        Ok(pair)
    }

    /// Create an identity and log it straight in
    ///
    /// # Errors
    /// Validation errors for bad fields, `AlreadyExists` for a taken email
    pub fn register(&self, registration: Registration) -> Result<TokenPair, AppError> {
        let identity = self.create_identity(registration)?;

        let pair = self.issue_pair(&identity, false)?;
        tracing::info!(user_id = %identity.id, "User registered");
        Ok(pair)
    }

    /// Validate, hash and store a new identity without issuing tokens
    pub fn create_identity(&self, registration: Registration) -> Result<Identity, AppError> {
        let email = is_valid_email(&registration.email)?;
        let name = is_valid_name(&registration.name)?;
        let age = is_valid_age(registration.age)?;
        let password_hash = self.hasher.hash(&registration.password)?;

        let identity = self.resolver.store().create_identity(NewIdentity {
            name,
            email,
            password_hash,
            age,
        })?;

        Ok(identity)
    }

    /// New access token for a live refresh token; the refresh token is kept
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let user_id = self.refresh_tokens.verify_and_resolve_user(refresh_token)?;
        let identity = self.resolver.resolve_user_id(user_id)?;

        let access_token = self.issue_access_token(&identity)?;
        tracing::info!(user_id = %user_id, "Access token refreshed");

        Ok(TokenPair {
            access_token,
            refresh_token: None,
        })
    }

    /// Always succeeds, whether or not the token was known
    pub fn logout(&self, refresh_token: &str) {
        self.refresh_tokens.invalidate(refresh_token);
        tracing::info!("Refresh token invalidated");
    }

    fn issue_pair(&self, identity: &Identity, remember_me: bool) -> Result<TokenPair, AppError> {
        let access_token = self.issue_access_token(identity)?;
        let refresh_token = self.refresh_tokens.create(identity.id, remember_me);

        Ok(TokenPair {
            access_token,
            refresh_token: Some(refresh_token),
        })
    }

    fn issue_access_token(&self, identity: &Identity) -> Result<String, AppError> {
        self.codec
            .issue_access_token(IdentityResolver::expected_subject(identity), identity.id)
    }

    /// Remove an identity; tokens it already holds stop resolving
    pub fn delete_identity(&self, user_id: Uuid) {
        self.resolver.store().delete(user_id);
        tracing::info!(user_id = %user_id, "Identity deleted");
    }
}
