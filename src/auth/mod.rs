/// Authentication module
///
/// Access token codec, refresh token lifecycle, password hashing,
/// identity resolution and the gate that ties them together.

mod claims;
mod clock;
mod gate;
mod jwt;
mod password;
mod refresh_token;
mod resolver;

pub use claims::Claims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::{
    AuthOutcome, AuthenticatedContext, AuthenticationGate, Registration, TokenPair, USER_ROLE,
};
pub use jwt::TokenCodec;
pub use password::PasswordHasher;
pub use refresh_token::{
    generate_refresh_token, InMemoryRefreshTokenStore, RefreshTokenRecord, RefreshTokenStore,
};
pub use resolver::IdentityResolver;
