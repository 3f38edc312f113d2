//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When the cache learns about a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Cache is updated before either tier confirms. A failed write leaves
    /// the new value in the cache.
    #[default]
    Optimistic,
    /// Cache is updated only after both local and remote confirm.
    Confirmed,
}

impl WritePolicy {
    /// Returns true if the cache is written ahead of the tiers.
    pub fn is_optimistic(&self) -> bool {
        matches!(self, Self::Optimistic)
    }

    /// Returns true if the cache waits for both tiers.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::Optimistic => write!(f, "optimistic"),
            WritePolicy::Confirmed => write!(f, "confirmed"),
        }
    }
}

impl FromStr for WritePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Ok(WritePolicy::Optimistic),
            "confirmed" => Ok(WritePolicy::Confirmed),
            other => Err(ConfigError::InvalidValue {
                field: "write_policy".to_string(),
                value: other.to_string(),
                reason: "expected 'optimistic' or 'confirmed'".to_string(),
            }),
        }
    }
}

/// Repository configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// How writes reach the cache.
    pub write_policy: WritePolicy,
    /// Rebuild the local store from the remote set after a remote bulk load.
    pub write_back_on_remote_load: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            write_policy: WritePolicy::Optimistic,
            write_back_on_remote_load: true,
        }
    }
}

impl RepositoryConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the write policy.
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Enable or disable the local write-back after a remote bulk load.
    pub fn with_write_back(mut self, enabled: bool) -> Self {
        self.write_back_on_remote_load = enabled;
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `ROLLCALL_WRITE_POLICY`: `optimistic` or `confirmed` (default: optimistic)
    /// - `ROLLCALL_WRITE_BACK`: `true`/`1` or `false`/`0` (default: true)
    /// - A malformed value is a `ConfigError`, not a silent default.
    pub fn from_env() -> RollcallResult<Self> {
        let defaults = Self::default();

        let write_policy = match std::env::var("ROLLCALL_WRITE_POLICY") {
            Ok(raw) => raw.parse::<WritePolicy>()?,
            Err(_) => defaults.write_policy,
        };

        let write_back_on_remote_load = match std::env::var("ROLLCALL_WRITE_BACK") {
            Ok(raw) => parse_flag("write_back_on_remote_load", &raw)?,
            Err(_) => defaults.write_back_on_remote_load,
        };

        Ok(Self {
            write_policy,
            write_back_on_remote_load,
        })
    }
}

fn parse_flag(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: other.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_optimistic_with_write_back() {
        let config = RepositoryConfig::default();
        assert!(config.write_policy.is_optimistic());
        assert!(config.write_back_on_remote_load);
    }

    #[test]
    fn test_config_builder() {
        let config = RepositoryConfig::new()
            .with_write_policy(WritePolicy::Confirmed)
            .with_write_back(false);
        assert!(config.write_policy.is_confirmed());
        assert!(!config.write_back_on_remote_load);
    }

    #[test]
    fn test_write_policy_parse() {
        assert_eq!("optimistic".parse::<WritePolicy>().unwrap(), WritePolicy::Optimistic);
        assert_eq!(" Confirmed ".parse::<WritePolicy>().unwrap(), WritePolicy::Confirmed);
        let err = "eager".parse::<WritePolicy>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_write_policy_display_round_trips() {
        for policy in [WritePolicy::Optimistic, WritePolicy::Confirmed] {
            assert_eq!(policy.to_string().parse::<WritePolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("f", "TRUE").unwrap());
        assert!(!parse_flag("f", "0").unwrap());
        assert!(parse_flag("f", "maybe").is_err());
    }
}
