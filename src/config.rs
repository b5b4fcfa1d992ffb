//! Configuration management for Heliotrope
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{HeliotropeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Monitoring portal endpoint configuration
    pub portal: PortalConfig,

    /// Account credentials for the portal
    pub credentials: CredentialsConfig,

    /// Selected plant
    pub plant: PlantConfig,

    /// Optional session seed handed over by the onboarding flow
    #[serde(default)]
    pub session: SessionSeedConfig,

    /// Polling schedule
    pub polling: PollingConfig,

    /// Session cache persistence
    pub persistence: PersistenceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Monitoring portal endpoint parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the portal. Plaintext HTTP is what the upstream API
    /// speaks; the signature scheme is the only request authentication.
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Account credentials as supplied during onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Portal account name
    pub username: String,

    /// Portal account password (sent SHA-1 hashed, stored as supplied).
    /// Must never appear in logs.
    pub password: String,

    /// Vendor/installer company key
    pub company_key: String,
}

/// Selected plant reference, immutable after onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantConfig {
    /// Plant ID as assigned by the portal
    pub plant_id: u64,

    /// Human-readable plant name
    pub plant_name: String,
}

/// Token/secret pair handed over by the onboarding flow, if any.
/// Used only until the first re-authentication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSeedConfig {
    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub secret: String,
}

/// Polling schedule parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between refresh cycles in seconds
    pub update_interval_secs: u64,

    /// Maximum session age before a proactive re-authentication, in hours
    pub reauth_interval_hours: u64,
}

/// Session cache persistence parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path of the cached session file
    pub session_file: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.shinemonitor.com".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 300,
            reauth_interval_hours: 24,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            session_file: "/data/heliotrope_session.json".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/heliotrope.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            credentials: CredentialsConfig::default(),
            plant: PlantConfig::default(),
            session: SessionSeedConfig::default(),
            polling: PollingConfig::default(),
            persistence: PersistenceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "heliotrope_config.yaml",
            "/data/heliotrope_config.yaml",
            "/etc/heliotrope/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Load configuration from an explicit path, or the default locations
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::load(),
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.portal.base_url.is_empty() {
            return Err(HeliotropeError::validation(
                "portal.base_url",
                "Base URL cannot be empty",
            ));
        }

        if self.portal.timeout_secs == 0 {
            return Err(HeliotropeError::validation(
                "portal.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if self.credentials.username.is_empty() {
            return Err(HeliotropeError::validation(
                "credentials.username",
                "Username cannot be empty",
            ));
        }

        if self.credentials.password.is_empty() {
            return Err(HeliotropeError::validation(
                "credentials.password",
                "Password cannot be empty",
            ));
        }

        if self.credentials.company_key.is_empty() {
            return Err(HeliotropeError::validation(
                "credentials.company_key",
                "Company key cannot be empty",
            ));
        }

        if self.polling.update_interval_secs == 0 {
            return Err(HeliotropeError::validation(
                "polling.update_interval_secs",
                "Must be greater than 0",
            ));
        }

        if self.polling.reauth_interval_hours == 0 {
            return Err(HeliotropeError::validation(
                "polling.reauth_interval_hours",
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.credentials.username = "user".to_string();
        config.credentials.password = "secret".to_string();
        config.credentials.company_key = "key".to_string();
        config.plant.plant_id = 12345;
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.portal.base_url, "http://api.shinemonitor.com");
        assert_eq!(config.portal.timeout_secs, 15);
        assert_eq!(config.polling.update_interval_secs, 300);
        assert_eq!(config.polling.reauth_interval_hours, 24);
    }

    #[test]
    fn test_config_validation() {
        let config = valid_config();
        assert!(config.validate().is_ok());

        let mut config = valid_config();
        config.credentials.username = String::new();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.polling.update_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = valid_config();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.portal.base_url, deserialized.portal.base_url);
        assert_eq!(config.plant.plant_id, deserialized.plant.plant_id);
    }
}
