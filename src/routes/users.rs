/// User Routes
///
/// Protected user management. Every handler takes `AuthenticatedUser`, so an
/// anonymous request is rejected with 401 before any store access.

use actix_web::{web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthenticationGate;
use crate::error::AppError;
use crate::identity::Identity;
use crate::middleware::AuthenticatedUser;
use crate::routes::auth::RegisterRequest;

/// User information response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub created_at: String,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            name: identity.name,
            email: identity.email,
            age: identity.age,
            created_at: identity.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/me
pub async fn get_current_user(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(user.0.identity))
}

/// GET /api/users
pub async fn list_users(
    _user: AuthenticatedUser,
    gate: web::Data<AuthenticationGate>,
) -> HttpResponse {
    let users: Vec<UserResponse> = gate
        .resolver()
        .store()
        .all()
        .into_iter()
        .map(UserResponse::from)
        .collect();

    HttpResponse::Ok().json(users)
}

/// POST /api/users
///
/// # Errors
/// - 400: Validation errors
/// - 409: Email already registered
pub async fn create_user(
    _user: AuthenticatedUser,
    form: web::Json<RegisterRequest>,
    gate: web::Data<AuthenticationGate>,
) -> Result<HttpResponse, AppError> {
    let identity = gate.create_identity(form.into_inner().into())?;

    Ok(HttpResponse::Created().json(UserResponse::from(identity)))
}

/// GET /api/users/{id}
///
/// # Errors
/// - 404: No user with that id
pub async fn get_user(
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
    gate: web::Data<AuthenticationGate>,
) -> Result<HttpResponse, AppError> {
    let identity = gate.resolver().resolve_user_id(path.into_inner())?;

    Ok(HttpResponse::Ok().json(UserResponse::from(identity)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    _user: AuthenticatedUser,
    path: web::Path<Uuid>,
    gate: web::Data<AuthenticationGate>,
) -> HttpResponse {
    gate.delete_identity(path.into_inner());
    HttpResponse::NoContent().finish()
}
