use anyhow::{bail, Context};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::api::auth::SessionConfig;
use crate::services::SeedAdmin;

/// Server configuration loaded from environment variables.
///
/// | Env Var                    | Default                |
/// |----------------------------|------------------------|
/// | `HOST`                     | `0.0.0.0`              |
/// | `PORT`                     | `8083`                 |
/// | `DATABASE_URL`             | required               |
/// | `DATABASE_MAX_CONNECTIONS` | `10`                   |
/// | `NATS_URL`                 | unset (no events)      |
/// | `SESSION_SECRET`           | required               |
/// | `SESSION_MAX_AGE_DAYS`     | `30`                   |
/// | `LOGOS_DIR`                | `public/src/logoanim`  |
/// | `LOGOS_URL_PREFIX`         | `/src/logoanim`        |
/// | `SEED_DEFAULTS`            | `false`                |
/// | `ADMIN_EMAIL`              | unset                  |
/// | `ADMIN_PASSWORD`           | unset                  |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub nats_url: Option<String>,
    pub session: SessionConfig,
    pub logos_dir: PathBuf,
    pub logos_url_prefix: String,
    pub seed_defaults: bool,
    /// Account ensured at start-up when seeding is on.
    pub seed_admin: Option<SeedAdmin>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret = var("SESSION_SECRET").context("SESSION_SECRET must be set")?;
        let max_age_days: i64 = parse_or(var("SESSION_MAX_AGE_DAYS"), "SESSION_MAX_AGE_DAYS", SessionConfig::DEFAULT_MAX_AGE_DAYS)?;
        if max_age_days <= 0 {
            bail!("SESSION_MAX_AGE_DAYS must be positive");
        }

        let seed_admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            (None, None) => None,
            _ => bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(var("PORT"), "PORT", 8083)?,
            database_url,
            database_max_connections: parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10)?,
            nats_url: var("NATS_URL"),
            session: SessionConfig { secret, max_age_days },
            logos_dir: var("LOGOS_DIR").unwrap_or_else(|| "public/src/logoanim".into()).into(),
            logos_url_prefix: var("LOGOS_URL_PREFIX").unwrap_or_else(|| "/src/logoanim".into()),
            seed_defaults: parse_or(var("SEED_DEFAULTS"), "SEED_DEFAULTS", false)?,
            seed_admin,
        })
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e| anyhow::anyhow!("{key} has invalid value {raw:?}: {e}")),
    }
}
