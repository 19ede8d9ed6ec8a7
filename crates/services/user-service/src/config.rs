//! User service configuration.

use std::env;
use std::str::FromStr;

use common::{DatabaseConfig, Environment, HashingConfig};
use domain::HashCost;

/// User service configuration.
#[derive(Clone)]
pub struct UserServiceConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Deployment environment
    pub environment: Environment,
    /// Password hashing cost
    pub hashing: HashingConfig,
}

impl std::fmt::Debug for UserServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.database.max_connections)
            .field("environment", &self.environment)
            .field("hashing", &self.hashing)
            .finish()
    }
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = DatabaseConfig::default();

        let environment = parse_or_warn::<Environment>(&lookup, "APP_ENV").unwrap_or_default();
        let hash_override = parse_or_warn::<HashCost>(&lookup, "PASSWORD_HASH_COST");

        Self {
            database: DatabaseConfig {
                url: lookup("USER_SERVICE_DATABASE_URL")
                    .or_else(|| lookup("DATABASE_URL"))
                    .unwrap_or(defaults.url),
                max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.max_connections),
                min_connections: lookup("DATABASE_MIN_CONNECTIONS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.min_connections),
            },
            environment,
            hashing: HashingConfig::resolve(environment, hash_override),
        }
    }
}

fn parse_or_warn<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> UserServiceConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        UserServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.database.url, "sqlite://users.db?mode=rwc");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.hashing.cost, HashCost::Minimum);
    }

    #[test]
    fn test_service_specific_url_wins() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://shared"),
            ("USER_SERVICE_DATABASE_URL", "postgres://users"),
        ]);
        assert_eq!(config.database.url, "postgres://users");
    }

    #[test]
    fn test_production_uses_default_cost() {
        let config = config_from(&[("APP_ENV", "production")]);
        assert_eq!(config.hashing.cost, HashCost::Default);
    }

    #[test]
    fn test_hash_cost_override() {
        let config = config_from(&[("APP_ENV", "production"), ("PASSWORD_HASH_COST", "min")]);
        assert_eq!(config.hashing.cost, HashCost::Minimum);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("APP_ENV", "staging"),
            ("PASSWORD_HASH_COST", "cheap"),
            ("DATABASE_MAX_CONNECTIONS", "lots"),
        ]);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.hashing.cost, HashCost::Minimum);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_debug_redacts_url() {
        let config = config_from(&[("DATABASE_URL", "postgres://user:secret@db/users")]);
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
