/// Authentication Routes
///
/// Credential exchange: registration, login, access-token refresh and logout.
/// All four are public; every other route needs a bearer token.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthenticationGate, Registration, TokenPair};
use crate::error::AppError;

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub age: u32,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            age: req.age,
        }
    }
}

/// User login request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Refresh and logout request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token response; `refreshToken` is null after a refresh
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl From<TokenPair> for AuthResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// POST /auth/register
///
/// # Errors
/// - 400: Validation errors (invalid email/name/password/age)
/// - 409: Email already registered
#[tracing::instrument(name = "user_registration", skip(form, gate))]
pub async fn register(
    form: web::Json<RegisterRequest>,
    gate: web::Data<AuthenticationGate>,
) -> Result<HttpResponse, AppError> {
    let pair = gate.register(form.into_inner().into())?;

    Ok(HttpResponse::Ok().json(AuthResponse::from(pair)))
}

/// POST /auth/login
///
/// # Errors
/// - 401: Invalid credentials (same response for unknown email and wrong password)
#[tracing::instrument(name = "user_login", skip(form, gate))]
pub async fn login(
    form: web::Json<LoginRequest>,
    gate: web::Data<AuthenticationGate>,
) -> Result<HttpResponse, AppError> {
    let pair = gate.login(&form.email, &form.password, form.remember_me)?;

    Ok(HttpResponse::Ok().json(AuthResponse::from(pair)))
}

/// POST /auth/refresh
///
/// Issues a new access token only. The refresh token is not rotated.
///
/// # Errors
/// - 401: Invalid or expired refresh token
/// - 404: The token's owner no longer exists
#[tracing::instrument(name = "token_refresh", skip(form, gate))]
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    gate: web::Data<AuthenticationGate>,
) -> Result<HttpResponse, AppError> {
    let pair = gate.refresh(&form.refresh_token)?;

    Ok(HttpResponse::Ok().json(AuthResponse::from(pair)))
}

/// POST /auth/logout
///
/// Always 200 with an empty body, known token or not.
pub async fn logout(
    form: web::Json<RefreshRequest>,
    gate: web::Data<AuthenticationGate>,
) -> HttpResponse {
    gate.logout(&form.refresh_token);
    HttpResponse::Ok().finish()
}
