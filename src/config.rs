//! Service Configuration
//! Mission: Load process-wide settings once at startup

use anyhow::{Context, Result};
use std::env;

/// Process-wide configuration, read from the environment exactly once.
///
/// Token secrets have no defaults: the service refuses to start without
/// them rather than fall back to a hardcoded value.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: String,
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);

        let db_path = env::var("AUTH_DB_PATH").unwrap_or_else(|_| "auth.db".to_string());

        let access_secret =
            env::var("ACCESS_TOKEN_SECRET").context("ACCESS_TOKEN_SECRET must be set")?;
        let refresh_secret =
            env::var("REFRESH_TOKEN_SECRET").context("REFRESH_TOKEN_SECRET must be set")?;

        let access_ttl_minutes = env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(15);

        let refresh_ttl_days = env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(7);

        Ok(Self {
            port,
            db_path,
            access_secret,
            refresh_secret,
            access_ttl_minutes,
            refresh_ttl_days,
        })
    }
}
