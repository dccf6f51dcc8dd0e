use config::ConfigError;

use crate::error::{AppError, ConfigError as SettingsError};

/// HS256 needs at least 256 bits of key material
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64, // seconds (900 = 15 minutes)
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64, // seconds (604800 = 7 days)
    #[serde(default = "default_remember_me_multiplier")]
    pub remember_me_multiplier: i32,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl JwtSettings {
    /// Reject settings the codec cannot safely sign with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(SettingsError::InvalidValue(format!(
                "jwt.secret must be at least {} bytes",
                MIN_SECRET_LENGTH
            ))
            .into());
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(SettingsError::InvalidValue(
                "token expiry values must be positive".to_string(),
            )
            .into());
        }
        if self.remember_me_multiplier < 1 {
            return Err(SettingsError::InvalidValue(
                "jwt.remember_me_multiplier must be at least 1".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            hash_cost: default_hash_cost(),
        }
    }
}

/// Browser origins allowed to call `/auth` and `/api`
#[derive(serde::Deserialize, Clone)]
pub struct CorsSettings {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: usize, // seconds a preflight may be cached
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            max_age: default_cors_max_age(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_access_token_expiry() -> i64 {
    15 * 60
}

fn default_refresh_token_expiry() -> i64 {
    7 * 24 * 60 * 60
}

fn default_remember_me_multiplier() -> i32 {
    4
}

fn default_issuer() -> String {
    "authgate".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_cors_max_age() -> usize {
    3600
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

/// Load settings from `configuration.{yaml,toml,json}` and `APP_*` env vars
///
/// Nested keys use a double underscore, e.g. `APP_JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
