use std::{
    env,
    fmt::Display,
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use log::{info, warn};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;

use crate::constants::DEFAULT_TOKEN_LIFETIME_HOURS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub token_lifetime_hours: i64,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token_lifetime_hours = try_load(
            &lookup,
            "TOKEN_LIFETIME_HOURS",
            &DEFAULT_TOKEN_LIFETIME_HOURS.to_string(),
        )?;

        Ok(Self {
            host: try_load(&lookup, "RECIPE_API_HOST", "0.0.0.0")?,
            port: try_load(&lookup, "RECIPE_API_PORT", "8000")?,
            database_url: try_load(&lookup, "DATABASE_URL", "sqlite://recipes.db?mode=rwc")?,
            max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
            jwt_secret: load_secret(&lookup, "JWT_SECRET"),
            token_lifetime_hours,
        })
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

fn load_secret<F>(lookup: &F, key: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|secret| !secret.is_empty()) {
        Some(secret) => secret,
        None => {
            warn!("{key} not set, generated a random one; sessions will not survive a restart");
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(64)
                .map(char::from)
                .collect()
        }
    }
}
