use chrono::Duration;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

use crate::similarity::SimilarityPolicy;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::SecurityHeadersLayer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/events";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SIMILARITY_WINDOW_DAYS: i64 = 7;
const DEFAULT_SIMILARITY_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub api_prefix: String,
    pub cors_allowed_origins: String,
    pub production: bool,
    pub similarity: SimilarityPolicy,
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts.
fn database_url(lookup: &impl Fn(&str) -> Option<String>) -> String {
    if let Some(url) = lookup("DATABASE_URL") {
        return url;
    }
    let Some(host) = lookup("DB_HOST") else {
        return DEFAULT_DATABASE_URL.to_string();
    };

    let port = lookup("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let name = lookup("DB_NAME").unwrap_or_else(|| "events".to_string());
    let credentials = match (lookup("DB_USERNAME"), lookup("DB_PASSWORD")) {
        (Some(user), Some(password)) => format!("{}:{}@", user, password),
        (Some(user), None) => format!("{}@", user),
        _ => String::new(),
    };
    format!("postgres://{}{}:{}/{}", credentials, host, port, name)
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn similarity_policy(
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<SimilarityPolicy, ConfigError> {
    let policy = lookup("SIMILARITY_POLICY").unwrap_or_else(|| "temporal".to_string());
    match policy.trim().to_lowercase().as_str() {
        "temporal" => {
            let days = parse_or(lookup, "SIMILARITY_WINDOW_DAYS", DEFAULT_SIMILARITY_WINDOW_DAYS)?;
            let window = Duration::try_days(days)
                .filter(|_| days > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "SIMILARITY_WINDOW_DAYS",
                    value: days.to_string(),
                })?;
            Ok(SimilarityPolicy::Temporal { window })
        }
        "spatial" => {
            let radius_km: f64 =
                parse_or(lookup, "SIMILARITY_RADIUS_KM", DEFAULT_SIMILARITY_RADIUS_KM)?;
            if !radius_km.is_finite() || radius_km <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: "SIMILARITY_RADIUS_KM",
                    value: radius_km.to_string(),
                });
            }
            Ok(SimilarityPolicy::Spatial { radius_km })
        }
        _ => Err(ConfigError::InvalidValue {
            key: "SIMILARITY_POLICY",
            value: policy,
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: database_url(&lookup),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            host: parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            api_prefix: normalize_prefix(&lookup("API_PREFIX").unwrap_or_default()),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| cors::DEFAULT_ALLOWED_ORIGINS.to_string()),
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
            similarity: similarity_policy(&lookup)?,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
