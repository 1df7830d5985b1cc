use std::net::SocketAddr;
use std::str::FromStr;

use crate::{DEFAULT_SESSION_TTL_SECONDS, DEFAULT_STATS_TTL_SECONDS};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read from the environment (optionally via `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// PostgreSQL document store when set, in-memory otherwise.
    pub database_url: Option<String>,
    /// Redis cache when set, in-memory otherwise.
    pub redis_url: Option<String>,
    pub stats_cache_ttl_seconds: u64,
    pub session_ttl_seconds: u64,
    pub seed_demo_data: bool,
    /// Used when RUST_LOG is not set.
    pub log_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_or(
            "HOTEL_BIND_ADDR",
            get("HOTEL_BIND_ADDR"),
            DEFAULT_BIND_ADDR.parse(),
        )?;
        let stats_cache_ttl_seconds = positive_secs(
            "STATS_CACHE_TTL_SECONDS",
            get("STATS_CACHE_TTL_SECONDS"),
            DEFAULT_STATS_TTL_SECONDS,
        )?;
        let session_ttl_seconds = positive_secs(
            "SESSION_TTL_SECONDS",
            get("SESSION_TTL_SECONDS"),
            DEFAULT_SESSION_TTL_SECONDS,
        )?;
        let seed_demo_data = match get("SEED_DEMO_DATA") {
            None => false,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SEED_DEMO_DATA",
                        value: v,
                        reason: "expected true or false".into(),
                    });
                }
            },
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            stats_cache_ttl_seconds,
            session_ttl_seconds,
            seed_demo_data,
            log_filter: get("LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

fn parse_or<T>(
    key: &'static str,
    raw: Option<String>,
    default: Result<T, T::Err>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let (value, parsed) = match raw {
        Some(value) => {
            let parsed = value.parse::<T>();
            (value, parsed)
        }
        None => (String::new(), default),
    };
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        value,
        reason: e.to_string(),
    })
}

fn positive_secs(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let secs = parse_or(key, raw, Ok(default))?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: "0".into(),
            reason: "must be at least one second".into(),
        });
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.stats_cache_ttl_seconds, 30);
        assert_eq!(config.session_ttl_seconds, 3600);
        assert!(!config.seed_demo_data);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HOTEL_BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://hotel@localhost/hotel"),
            ("REDIS_URL", "  "),
            ("STATS_CACHE_TTL_SECONDS", "5"),
            ("SEED_DEMO_DATA", "TRUE"),
            ("LOG_FILTER", "hotel_api=debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://hotel@localhost/hotel"));
        assert_eq!(config.redis_url, None);
        assert_eq!(config.stats_cache_ttl_seconds, 5);
        assert!(config.seed_demo_data);
        assert_eq!(config.log_filter, "hotel_api=debug");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config(&[("HOTEL_BIND_ADDR", "not-an-address")]),
            Err(ConfigError::Invalid { key: "HOTEL_BIND_ADDR", .. })
        ));
        assert!(matches!(
            config(&[("SESSION_TTL_SECONDS", "-1")]),
            Err(ConfigError::Invalid { key: "SESSION_TTL_SECONDS", .. })
        ));
        assert!(matches!(
            config(&[("STATS_CACHE_TTL_SECONDS", "0")]),
            Err(ConfigError::Invalid { key: "STATS_CACHE_TTL_SECONDS", .. })
        ));
        assert!(matches!(
            config(&[("SEED_DEMO_DATA", "maybe")]),
            Err(ConfigError::Invalid { key: "SEED_DEMO_DATA", .. })
        ));
    }
}
