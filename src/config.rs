//! Server configuration from the process environment

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::SubgraphError;

pub const DEFAULT_PORT: u16 = 4000;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = SubgraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(SubgraphError::Config(format!(
                "LOG_FORMAT must be 'json' or 'pretty', got '{}'",
                other
            ))),
        }
    }
}

/// Settings shared by both servers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub introspection: bool,
    pub log_format: LogFormat,
    /// Postgres URL; the energy API falls back to in-memory data without it
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            introspection: true,
            log_format: LogFormat::Json,
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ServerConfig {
    /// Read configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// Unset or empty variables take their defaults; malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: parse_or(get("HOST"), "HOST", defaults.host)?,
            port: parse_or(get("PORT"), "PORT", defaults.port)?,
            introspection: match get("GRAPHQL_INTROSPECTION") {
                Some(raw) => parse_bool("GRAPHQL_INTROSPECTION", &raw)?,
                None => defaults.introspection,
            },
            log_format: match get("LOG_FORMAT") {
                Some(raw) => raw.parse()?,
                None => defaults.log_format,
            },
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(
                get("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> crate::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| SubgraphError::Config(format!("invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> crate::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SubgraphError::Config(format!("invalid {} '{}': expected a boolean", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> crate::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr().port(), 4000);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "4001"),
            ("GRAPHQL_INTROSPECTION", "off"),
            ("LOG_FORMAT", "pretty"),
            ("DATABASE_URL", "postgres://localhost/energy"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:4001".parse::<SocketAddr>().unwrap());
        assert!(!config.introspection);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/energy"));
        assert_eq!(config.database_max_connections, 12);
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let config = config_from(&[("PORT", ""), ("DATABASE_URL", "  ")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(matches!(config_from(&[("PORT", "abc")]), Err(SubgraphError::Config(_))));
        assert!(matches!(config_from(&[("PORT", "70000")]), Err(SubgraphError::Config(_))));
        assert!(matches!(
            config_from(&[("GRAPHQL_INTROSPECTION", "maybe")]),
            Err(SubgraphError::Config(_))
        ));
        assert!(matches!(config_from(&[("LOG_FORMAT", "xml")]), Err(SubgraphError::Config(_))));
    }
}
