use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{
    AuthenticationGate, Clock, IdentityResolver, InMemoryRefreshTokenStore, PasswordHasher,
    TokenCodec,
};
use crate::configuration::{CorsSettings, Settings};
use crate::error::{AppError, ValidationError};
use crate::identity::InMemoryIdentityStore;
use crate::logger::LoggerMiddleware;
use crate::middleware::AuthenticationFilter;
use crate::routes::{
    create_user, delete_user, get_current_user, get_user, health_check, list_users, login, logout,
    not_found, refresh, register,
};

/// Wire the codec, stores and hasher from settings
///
/// # Errors
/// Returns a configuration error if the JWT settings are unusable
pub fn build_gate(settings: &Settings, clock: Arc<dyn Clock>) -> Result<AuthenticationGate, AppError> {
    settings.jwt.validate()?;

    let codec = TokenCodec::new(&settings.jwt, clock.clone());
    let refresh_tokens = Arc::new(InMemoryRefreshTokenStore::new(&settings.jwt, clock));
    let resolver = IdentityResolver::new(Arc::new(InMemoryIdentityStore::new()));
    let hasher = PasswordHasher::new(&settings.password);

    Ok(AuthenticationGate::new(codec, resolver, refresh_tokens, hasher))
}

/// Cross-origin policy for browser clients of `/auth` and `/api`
fn cors_policy(settings: &CorsSettings) -> Cors {
    settings
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .supports_credentials()
        .max_age(settings.max_age)
}

pub fn run(
    listener: TcpListener,
    gate: AuthenticationGate,
    cors: CorsSettings,
) -> Result<Server, std::io::Error> {
    let gate = web::Data::new(gate);

    let server = HttpServer::new(move || {
        // Malformed JSON bodies become a 400 with the usual error body
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            tracing::debug!("Rejected request body: {}", err);
            actix_web::Error::from(AppError::Validation(ValidationError::InvalidFormat(
                "request body".to_string(),
            )))
        });
        // Unparseable path segments such as a bad `{id}` likewise become a 400
        let path_config = web::PathConfig::default().error_handler(|err, req| {
            tracing::debug!("Rejected path {}: {}", req.path(), err);
            actix_web::Error::from(AppError::Validation(ValidationError::InvalidFormat(
                "id".to_string(),
            )))
        });

        App::new()
            // Global middleware
            .wrap(AuthenticationFilter::new(gate.clone()))
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(gate.clone())
            .app_data(json_config)
            .app_data(path_config)

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .wrap(cors_policy(&cors))
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/logout", web::post().to(logout)),
            )

            // Protected routes (handlers require AuthenticatedUser)
            .service(
                web::scope("/api")
                    .wrap(cors_policy(&cors))
                    .route("/me", web::get().to(get_current_user))
                    .route("/users", web::get().to(list_users))
                    .route("/users", web::post().to(create_user))
                    .route("/users/{id}", web::get().to(get_user))
                    .route("/users/{id}", web::delete().to(delete_user)),
            )
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
