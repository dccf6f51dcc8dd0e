/// Middleware module
///
/// Request authentication and the extractor protected routes use.

mod authenticated_user;
mod authentication;

pub use authenticated_user::AuthenticatedUser;
pub use authentication::AuthenticationFilter;
