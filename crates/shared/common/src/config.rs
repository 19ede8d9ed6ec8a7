//! Shared configuration structures.

use std::str::FromStr;

use domain::HashCost;
use serde::{Deserialize, Serialize};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Hash cost used when no explicit override is configured
    pub fn default_hash_cost(&self) -> HashCost {
        match self {
            Environment::Production => HashCost::Default,
            Environment::Development | Environment::Test => HashCost::Minimum,
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://users.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

/// Password hashing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HashingConfig {
    pub cost: HashCost,
}

impl HashingConfig {
    /// Resolve the cost: an explicit override wins, otherwise the environment decides.
    pub fn resolve(environment: Environment, override_cost: Option<HashCost>) -> Self {
        Self {
            cost: override_cost.unwrap_or_else(|| environment.default_hash_cost()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Test);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_hash_cost_follows_environment() {
        assert_eq!(
            HashingConfig::resolve(Environment::Test, None).cost,
            HashCost::Minimum
        );
        assert_eq!(
            HashingConfig::resolve(Environment::Production, None).cost,
            HashCost::Default
        );
    }

    #[test]
    fn test_hash_cost_override_wins() {
        let config = HashingConfig::resolve(Environment::Production, Some(HashCost::Minimum));
        assert_eq!(config.cost, HashCost::Minimum);
    }
}
