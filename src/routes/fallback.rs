use actix_web::HttpResponse;

use crate::middleware::AuthenticatedUser;

/// Unmatched routes are protected too: anonymous callers get 401, not 404
pub async fn not_found(_user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::NotFound().finish()
}
