//! Configuration for the Agora API service.

use agora_auth_core::{parse_algorithm, AuthConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Agora API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Root directory of the local blob store
    pub media_root: PathBuf,

    /// Base URL used when building verification links
    pub public_base_url: String,

    /// How often expired sessions are swept
    pub sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database
        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", 10)?;

        // Server
        let http_port = parse_or(&var, "HTTP_PORT", 8000)?;

        // Signing secret (minimum 32 bytes, checked by AuthConfig)
        let secret_key = var("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;
        let algorithm = var("JWT_ALGORITHM").unwrap_or_else(|| "HS256".to_string());

        let access_minutes: u64 = parse_or(&var, "ACCESS_TOKEN_EXPIRE_MINUTES", 30)?;
        let refresh_days: u64 = parse_or(&var, "REFRESH_TOKEN_EXPIRE_DAYS", 30)?;
        let verification_minutes: u64 = parse_or(&var, "VERIFICATION_TOKEN_EXPIRE_MINUTES", 15)?;

        let algorithm = parse_algorithm(&algorithm).map_err(|_| ConfigError::Invalid("JWT_ALGORITHM"))?;
        let auth = AuthConfig::try_new(secret_key.as_bytes())
            .and_then(|config| config.with_algorithm(algorithm))
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_access_token_ttl(Duration::from_secs(access_minutes * 60))
            .with_refresh_token_ttl(Duration::from_secs(refresh_days * 24 * 3600))
            .with_verification_ttl(Duration::from_secs(verification_minutes * 60));

        // Media and links
        let media_root = PathBuf::from(var("MEDIA_ROOT").unwrap_or_else(|| "media".to_string()));
        let public_base_url = var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{http_port}"))
            .trim_end_matches('/')
            .to_string();

        let sweep_secs: u64 = parse_or(&var, "SESSION_SWEEP_INTERVAL_SECS", 300)?;
        if sweep_secs == 0 {
            return Err(ConfigError::Invalid("SESSION_SWEEP_INTERVAL_SECS"));
        }

        Ok(Self {
            http_port,
            database_url,
            db_max_connections,
            auth,
            media_root,
            public_base_url,
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}

fn parse_or<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/agora"),
            ("SECRET_KEY", SECRET),
        ])
        .unwrap();

        assert_eq!(config.http_port, 8000);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.auth.access_token_ttl, Duration::from_secs(30 * 60));
        assert_eq!(config.auth.refresh_token_ttl, Duration::from_secs(30 * 24 * 3600));
        assert_eq!(config.auth.verification_ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.public_base_url, "http://localhost:8000");
        assert_eq!(config.sweep_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/agora"),
            ("SECRET_KEY", SECRET),
            ("JWT_ALGORITHM", "HS512"),
            ("HTTP_PORT", "9000"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("PUBLIC_BASE_URL", "https://agora.example/"),
            ("MEDIA_ROOT", "/var/agora"),
        ])
        .unwrap();

        assert_eq!(config.http_port, 9000);
        assert_eq!(config.auth.algorithm, parse_algorithm("HS512").unwrap());
        assert_eq!(config.auth.access_token_ttl, Duration::from_secs(300));
        assert_eq!(config.public_base_url, "https://agora.example");
        assert_eq!(config.media_root, PathBuf::from("/var/agora"));
    }

    #[test]
    fn test_missing_required() {
        assert!(matches!(
            load(&[("SECRET_KEY", SECRET)]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://db")]),
            Err(ConfigError::Missing("SECRET_KEY"))
        ));
    }

    #[test]
    fn test_invalid_values() {
        let base = [("DATABASE_URL", "postgres://db"), ("SECRET_KEY", SECRET)];

        let mut vars = base.to_vec();
        vars.push(("HTTP_PORT", "eighty"));
        assert!(matches!(load(&vars), Err(ConfigError::Invalid("HTTP_PORT"))));

        let mut vars = base.to_vec();
        vars.push(("JWT_ALGORITHM", "RS256"));
        assert!(matches!(load(&vars), Err(ConfigError::Invalid("JWT_ALGORITHM"))));

        let mut vars = base.to_vec();
        vars.push(("SESSION_SWEEP_INTERVAL_SECS", "0"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid("SESSION_SWEEP_INTERVAL_SECS"))
        ));
    }

    #[test]
    fn test_short_secret() {
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://db"), ("SECRET_KEY", "short")]),
            Err(ConfigError::AuthConfig(_))
        ));
    }
}
