/// Error Handling Module
///
/// Every fallible operation in the service returns one of the domain error
/// types below, unified into `AppError`. The `ResponseError` implementation
/// at the bottom is the only place that turns an error kind into an HTTP
/// status code.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    OutOfRange(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::OutOfRange(field) => write!(f, "{} is out of range", field),
        }
    }
}

impl StdError for ValidationError {}

/// Access token validation failures
///
/// All three collapse to "invalid token" once they reach a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Malformed,
    Expired,
    SubjectMismatch,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "Token is malformed or has a bad signature"),
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::SubjectMismatch => write!(f, "Token subject does not match"),
        }
    }
}

impl StdError for TokenError {}

/// Refresh token lookup failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenError {
    NotFound,
    Expired,
}

impl fmt::Display for RefreshTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshTokenError::NotFound => write!(f, "Refresh token not found"),
            RefreshTokenError::Expired => write!(f, "Refresh token has expired"),
        }
    }
}

impl StdError for RefreshTokenError {}

/// Identity store errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    NotFound(String),
    AlreadyExists(String),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::NotFound(msg) => write!(f, "Not found: {}", msg),
            IdentityError::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
        }
    }
}

impl StdError for IdentityError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Authentication errors raised by the credential exchange and by the
/// authorization step on protected routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    MissingToken,
    TokenInvalid,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
        }
    }
}

impl StdError for AuthError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Auth(AuthError),
    Token(TokenError),
    RefreshToken(RefreshTokenError),
    Identity(IdentityError),
    Config(ConfigError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Token(e) => write!(f, "{}", e),
            AppError::RefreshToken(e) => write!(f, "{}", e),
            AppError::Identity(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Token(err)
    }
}

impl From<RefreshTokenError> for AppError {
    fn from(err: RefreshTokenError) -> Self {
        AppError::RefreshToken(err)
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        AppError::Identity(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, also present in the server log line
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            // Never reveals whether the email exists
            AppError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::Auth(AuthError::MissingToken) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid authorization header".to_string(),
            ),
            AppError::Auth(AuthError::TokenInvalid) | AppError::Token(_) => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_INVALID",
                "Invalid or expired token".to_string(),
            ),

            AppError::RefreshToken(_) => (
                StatusCode::UNAUTHORIZED,
                "REFRESH_TOKEN_INVALID",
                "Invalid or expired refresh token".to_string(),
            ),

            AppError::Identity(e) => match e {
                IdentityError::AlreadyExists(_) => {
                    (StatusCode::CONFLICT, "ALREADY_EXISTS", e.to_string())
                }
                IdentityError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
            },

            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Server configuration error".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = self.classify();

        let error_response =
            ErrorResponse::new(request_id.to_string(), message, code.to_string(), status.as_u16());

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, error = %self, "Invalid credentials attempt");
            }
            AppError::Auth(_) | AppError::Token(_) => {
                tracing::warn!(request_id = request_id, error = %self, "Authentication error");
            }
            AppError::RefreshToken(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Refresh token rejected");
            }
            AppError::Identity(IdentityError::AlreadyExists(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate identity attempt");
            }
            AppError::Identity(e) => {
                tracing::info!(request_id = request_id, error = %e, "Identity lookup failed");
            }
            AppError::Config(e) => {
                tracing::error!(request_id = request_id, error = %e, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

impl AppError {
    /// Log once under `request_id` and return it to the client as `error_id`
    fn respond(&self, request_id: &str) -> HttpResponse {
        self.log_error(request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, request_id);

        HttpResponse::build(status).json(error_response)
    }
}

/// Implement ResponseError for Actix-web integration
///
/// This is the only place a failed request is logged.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.respond(&uuid::Uuid::new_v4().to_string())
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}
