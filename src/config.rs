use anyhow::{Context, Result};
use std::str::FromStr;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read from the process environment. A `.env` file in the working directory
// is loaded first when present.
//
//   DATABASE_URL              postgres connection string; unset → in-memory
//   ADMIN_BIND_ADDR           default 0.0.0.0:8000
//   DATABASE_MAX_CONNECTIONS  default 5
//   DB_CONNECT_ATTEMPTS       default 5
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub max_connections: u32,
    pub connect_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: "0.0.0.0:8000".to_string(),
            max_connections: 5,
            connect_attempts: 5,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            bind_addr: non_empty("ADMIN_BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_or(
                non_empty("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                defaults.max_connections,
            )?,
            connect_attempts: parse_or(
                non_empty("DB_CONNECT_ATTEMPTS"),
                "DB_CONNECT_ATTEMPTS",
                defaults.connect_attempts,
            )?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, value)),
        None => Ok(default),
    }
}
