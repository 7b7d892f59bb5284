use std::env;

use crate::{Error, Result};

/// Ten years, in hours.
const MAX_JWT_MAXAGE: i64 = 24 * 365 * 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub jwt_maxage: i64,
    pub port: u16,
    pub client_url: Option<String>,
    pub upload_dir: String,
    pub max_upload_size: usize,
}

impl Config {
    pub fn init() -> Result<Config> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let jwt_maxage = token_lifetime(parsed("JWT_MAXAGE", 168))?;

        Ok(Config {
            database_url,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 10),
            jwt_secret,
            jwt_maxage,
            port: parsed("PORT", 5000),
            client_url: env::var("CLIENT_URL").ok().filter(|v| !v.is_empty()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            max_upload_size: parsed("MAX_UPLOAD_SIZE", 5 * 1024 * 1024),
        })
    }
}

fn required(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{key} must be set"))),
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn token_lifetime(hours: i64) -> Result<i64> {
    if (1..=MAX_JWT_MAXAGE).contains(&hours) {
        Ok(hours)
    } else {
        Err(Error::Config(format!(
            "JWT_MAXAGE must be between 1 and {MAX_JWT_MAXAGE} hours"
        )))
    }
}
