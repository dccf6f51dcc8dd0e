mod auth;
mod fallback;
mod health_check;
mod users;

pub use auth::{login, logout, refresh, register, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};
pub use fallback::not_found;
pub use health_check::health_check;
pub use users::{create_user, delete_user, get_current_user, get_user, list_users, UserResponse};
