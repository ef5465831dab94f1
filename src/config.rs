use anyhow::Context;
use axum::http::{HeaderValue, Method};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::services::account_registry::DEFAULT_ID_ATTEMPTS;
use crate::services::balance_engine::DEFAULT_RETRY_ATTEMPTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Postgres connection string. Without it the ledger lives in memory.
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub log_request_body: bool,
    pub log_format: LogFormat,
    pub id_generation_attempts: u32,
    pub balance_retry_attempts: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let log_format = match non_empty("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        };

        let config = Config {
            server_port: parse_or("SERVER_PORT", non_empty("SERVER_PORT"), 3000)?,
            database_url: non_empty("DATABASE_URL"),
            redis_url: non_empty("REDIS_URL"),
            cors_allowed_origins: parse_origins(
                &non_empty("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            ),
            log_request_body: parse_or("LOG_REQUEST_BODY", non_empty("LOG_REQUEST_BODY"), false)?,
            log_format,
            id_generation_attempts: parse_or(
                "ID_GENERATION_ATTEMPTS",
                non_empty("ID_GENERATION_ATTEMPTS"),
                DEFAULT_ID_ATTEMPTS,
            )?,
            balance_retry_attempts: parse_or(
                "BALANCE_RETRY_ATTEMPTS",
                non_empty("BALANCE_RETRY_ATTEMPTS"),
                DEFAULT_RETRY_ATTEMPTS,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server_port == 0 {
            anyhow::bail!("SERVER_PORT must be greater than 0");
        }
        if self.id_generation_attempts == 0 {
            anyhow::bail!("ID_GENERATION_ATTEMPTS must be at least 1");
        }
        if self.balance_retry_attempts == 0 {
            anyhow::bail!("BALANCE_RETRY_ATTEMPTS must be at least 1");
        }
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                anyhow::bail!("DATABASE_URL must be a postgres:// URL");
            }
        }
        self.cors_layer()?;
        Ok(())
    }

    pub fn cors_layer(&self) -> anyhow::Result<CorsLayer> {
        let origin = match &self.cors_allowed_origins {
            None => AllowOrigin::any(),
            Some(origins) => {
                let values = origins
                    .iter()
                    .map(|o| {
                        HeaderValue::from_str(o)
                            .with_context(|| format!("invalid CORS origin '{}'", o))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                AllowOrigin::list(values)
            }
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any))
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", name, value)),
        None => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let value = raw.trim();
    if value == "*" {
        return None;
    }

    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
        assert!(config.cors_allowed_origins.is_none());
        assert!(!config.log_request_body);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.id_generation_attempts, 8);
        assert_eq!(config.balance_retry_attempts, 16);
    }

    #[test]
    fn test_reads_values() {
        let config = config_from(&[
            ("SERVER_PORT", "8080"),
            ("DATABASE_URL", "postgres://app:secret@db:5432/ledger"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("LOG_REQUEST_BODY", "true"),
            ("LOG_FORMAT", "json"),
            ("BALANCE_RETRY_ATTEMPTS", "4"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(
            config.cors_allowed_origins,
            Some(vec!["https://a.example".to_string(), "https://b.example".to_string()])
        );
        assert!(config.log_request_body);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.balance_retry_attempts, 4);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(config_from(&[("SERVER_PORT", "http")]).is_err());
        assert!(config_from(&[("SERVER_PORT", "0")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "mysql://localhost")]).is_err());
        assert!(config_from(&[("ID_GENERATION_ATTEMPTS", "0")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://app:secret@db:5432/ledger"),
            "postgres://app:****@db:5432/ledger"
        );
        assert_eq!(mask_password("postgres://db/ledger"), "postgres://db/ledger");
    }
}
