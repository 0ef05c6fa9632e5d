//! Startup configuration. All settings are read once from the environment
//! and passed around as a struct; nothing here is global mutable state.

use crate::error::ConfigError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub server_port: u16,
    /// Items per page in list responses.
    pub page_size: u32,
    /// Keyword expected in the Authorization header (e.g. "Token <key>").
    pub auth_scheme: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/dealership".into());
        let server_port = parse_env("SERVER_PORT", 8000)?;
        let page_size = parse_env("PAGE_SIZE", 10)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_SIZE",
                value: "0".into(),
            });
        }
        let auth_scheme = std::env::var("AUTH_SCHEME").unwrap_or_else(|_| "Token".into());
        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(AppConfig {
            database_url,
            server_port,
            page_size,
            auth_scheme,
            cors_origins,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw,
        }),
    }
}
