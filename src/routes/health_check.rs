use actix_web::HttpResponse;

/// Public liveness probe; never needs a token
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
