use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub seed_file: Option<PathBuf>,
    /// The single origin browsers may call from; `None` allows any.
    pub allowed_origin: Option<String>,
    pub duplicate_session_guard: bool,
    pub require_session_id: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: None,
            seed_file: None,
            allowed_origin: None,
            duplicate_session_guard: true,
            require_session_id: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_addr = match get("BIND_ADDR") {
            Some(addr) => addr
                .parse::<SocketAddr>()
                .with_context(|| format!("BIND_ADDR is not a socket address: {}", addr))?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            bind_addr,
            database_url: get("DATABASE_URL"),
            seed_file: get("SEED_FILE").map(PathBuf::from),
            allowed_origin: get("ALLOWED_ORIGIN"),
            duplicate_session_guard: get("DUPLICATE_SESSION_GUARD")
                .map(|v| parse_bool("DUPLICATE_SESSION_GUARD", &v))
                .transpose()?
                .unwrap_or(defaults.duplicate_session_guard),
            require_session_id: get("REQUIRE_SESSION_ID")
                .map(|v| parse_bool("REQUIRE_SESSION_ID", &v))
                .transpose()?
                .unwrap_or(defaults.require_session_id),
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(anyhow!("{} must be a boolean, got {:?}", key, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]).unwrap(), Config::default());
    }

    #[test]
    fn reads_every_setting() {
        let c = config(&[
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("DATABASE_URL", "postgres://localhost/matches"),
            ("SEED_FILE", "seed.json"),
            ("ALLOWED_ORIGIN", "https://game.example.com"),
            ("DUPLICATE_SESSION_GUARD", "off"),
            ("REQUIRE_SESSION_ID", "Yes"),
        ])
        .unwrap();

        assert_eq!(c.bind_addr, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(c.database_url.as_deref(), Some("postgres://localhost/matches"));
        assert_eq!(c.seed_file, Some(PathBuf::from("seed.json")));
        assert_eq!(c.allowed_origin.as_deref(), Some("https://game.example.com"));
        assert!(!c.duplicate_session_guard);
        assert!(c.require_session_id);
    }

    #[test]
    fn blank_values_are_unset() {
        let c = config(&[("DATABASE_URL", "  "), ("ALLOWED_ORIGIN", "")]).unwrap();
        assert_eq!(c.database_url, None);
        assert_eq!(c.allowed_origin, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("REQUIRE_SESSION_ID", "maybe")]).is_err());
        assert!(config(&[("BIND_ADDR", "localhost")]).is_err());
    }
}
