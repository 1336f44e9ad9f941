use std::env;
use std::str::FromStr;

use dotenv::dotenv;
use thiserror::Error;

use crate::geodesy::AltitudeMode;

pub const DEFAULT_BIND: &str = "127.0.0.1:8088";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub bind: String,
    pub max_body_bytes: usize,
    pub pool_size: u32,
    pub altitude_mode: AltitudeMode,
}

impl Settings {
    /// Reads settings from the environment, after loading `.env` if present.
    pub fn from_env() -> Result<Settings, ConfigError> {
        dotenv().ok();
        Settings::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Settings {
            database_url,
            bind: lookup("TOURS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            max_body_bytes: parsed(&lookup, "TOURS_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            pool_size: parsed(&lookup, "TOURS_POOL_SIZE", DEFAULT_POOL_SIZE)?,
            altitude_mode: parsed(&lookup, "TOURS_ALTITUDE_MODE", AltitudeMode::default())?,
        })
    }
}

fn parsed<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        }),
        None => Ok(default),
    }
}
