//! Process configuration.
//!
//! Loaded from the environment exactly once in `main` and handed to the
//! components that need it; nothing reads the environment after startup.

use std::env;

use anyhow::{Context, Result};
use tracing::info;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
}

impl Config {
    /// Reads settings from the environment. `DATABASE_URL` and `JWT_SECRET`
    /// are required and their absence is fatal; `PORT` defaults to 4000.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => {
                info!("PORT not set, using default: 4000");
                4000
            }
        };

        Ok(Self {
            database_url,
            jwt_secret,
            port,
        })
    }
}
