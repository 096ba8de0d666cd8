//! Settings read from the environment (and `.env`, when present).

use crate::error::Error;

const DEFAULT_DATABASE_URL: &str = "grocery.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_POOL_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file path, or `:memory:`.
    pub database_url: String,
    pub bind_addr: String,
    pub pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(Error::Config(format!(
                        "DB_POOL_SIZE must be a positive integer, got `{}`",
                        raw
                    )))
                }
            },
            None => defaults.pool_size,
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            pool_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_keys_use_defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn reads_every_key() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "/tmp/lists.db"),
            ("BIND_ADDR", "0.0.0.0:9000"),
            ("DB_POOL_SIZE", "8"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "/tmp/lists.db");
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.pool_size, 8);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("DB_POOL_SIZE", "0")])),
            Err(Error::Config(_))
        ));
        assert!(
            Config::from_lookup(lookup(&[("DB_POOL_SIZE", "many")])).is_err()
        );
    }
}
