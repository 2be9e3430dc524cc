use std::{env, str::FromStr};

use chrono::Duration;

use crate::session::DEFAULT_SESSION_TTL_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Database,
    Memory,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(SessionBackend::Database),
            "memory" => Ok(SessionBackend::Memory),
            other => Err(anyhow::anyhow!("unknown SESSION_BACKEND `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_backend: SessionBackend,
    /// Idle lifetime of a session cart.
    pub session_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let session_backend = match env::var("SESSION_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => SessionBackend::Database,
        };
        let session_ttl = match env::var("SESSION_TTL_SECS") {
            Ok(value) => parse_ttl(&value)?,
            Err(_) => Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        };
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            session_backend,
            session_ttl,
        })
    }
}

fn parse_ttl(value: &str) -> anyhow::Result<Duration> {
    match value.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Ok(Duration::seconds(secs)),
        _ => Err(anyhow::anyhow!("SESSION_TTL_SECS must be a positive number of seconds")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_backend_parses_known_names() {
        assert_eq!("memory".parse::<SessionBackend>().unwrap(), SessionBackend::Memory);
        assert_eq!(" Database ".parse::<SessionBackend>().unwrap(), SessionBackend::Database);
        assert!("redis".parse::<SessionBackend>().is_err());
    }

    #[test]
    fn session_ttl_must_be_positive_seconds() {
        assert_eq!(parse_ttl(" 3600 ").unwrap(), Duration::hours(1));
        assert!(parse_ttl("0").is_err());
        assert!(parse_ttl("-5").is_err());
        assert!(parse_ttl("two weeks").is_err());
    }
}
