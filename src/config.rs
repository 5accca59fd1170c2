use std::{fmt::Display, str::FromStr};

use log::{info, warn};

use crate::error::Error;

pub static DATABASE_URL: &str = "DATABASE_URL";
pub static JWT_SECRET: &str = "JWT_SECRET";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub port: u16,
    pub max_connections: u32,
    pub session_days: i64,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        Ok(Self {
            database_url: dotenv::var(DATABASE_URL)?,
            jwt_secret: dotenv::var(JWT_SECRET)?,
            bind_addr: try_load("BIND_ADDR", "0.0.0.0")?,
            port: try_load("PORT", "8000")?,
            max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
            session_days: try_load("SESSION_DAYS", "14")?,
        })
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, Error>
where
    T::Err: Display,
{
    let value = dotenv::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });
    value.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        Error::ServerError(format!("invalid value for {key}: {value}"))
    })
}
