/// Authorization step for protected handlers
///
/// Resolves to the context the authentication filter attached, or rejects
/// with 401 when the request is anonymous.

use actix_web::{dev::Payload, http::header, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::AuthenticatedContext;
use crate::error::{AppError, AuthError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthenticatedContext);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let context = req.extensions().get::<AuthenticatedContext>().cloned();

        let result = match context {
            Some(context) => Ok(AuthenticatedUser(context)),
            // A header was sent but did not authenticate
            None if req.headers().contains_key(header::AUTHORIZATION) => {
                Err(AuthError::TokenInvalid.into())
            }
            None => Err(AuthError::MissingToken.into()),
        };

        ready(result)
    }
}
