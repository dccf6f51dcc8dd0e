/// Authentication Middleware
///
/// Runs the per-request token check for every route and, when it succeeds,
/// injects an `AuthenticatedContext` into request extensions. It never
/// rejects a request; protected handlers ask for `AuthenticatedUser`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{AuthOutcome, AuthenticationGate};

pub struct AuthenticationFilter {
    gate: web::Data<AuthenticationGate>,
}

impl AuthenticationFilter {
    pub fn new(gate: web::Data<AuthenticationGate>) -> Self {
        Self { gate }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthenticationFilter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationFilterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthenticationFilterService {
            service: Rc::new(service),
            gate: self.gate.clone(),
        }))
    }
}

pub struct AuthenticationFilterService<S> {
    service: Rc<S>,
    gate: web::Data<AuthenticationGate>,
}

impl<S, B> Service<ServiceRequest> for AuthenticationFilterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = {
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok());
            self.gate.authenticate_header(authorization)
        };

        if let AuthOutcome::Authenticated(context) = outcome {
            req.extensions_mut().insert(context);
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
