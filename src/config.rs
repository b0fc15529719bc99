// ABOUTME: Configuration management for schema-atlas
// ABOUTME: Handles PostgreSQL connection profiles and discovery settings in a JSON file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides the config file location when set
pub const CONFIG_PATH_ENV: &str = "SCHEMA_ATLAS_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Config directory not found")]
    NoDirFound,
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),
    #[error("Cannot remove the last profile")]
    LastProfile,
}

/// Connection profile for a PostgreSQL server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionProfile {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: Option<String>,
    /// Registry name for the engine; falls back to the database name
    #[serde(default)]
    pub engine_name: Option<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_port() -> u16 {
    5432
}

fn default_username() -> String {
    whoami::username()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ConnectionProfile {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_port(),
            username: default_username(),
            password: String::new(),
            database: Some("postgres".to_string()),
            engine_name: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Settings applied to every engine's discovery run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoverySettings {
    /// PostgreSQL regexes; matching schema names are skipped
    #[serde(default = "default_exclusions")]
    pub exclude_schemas: Vec<String>,
    #[serde(default)]
    pub include_views: bool,
}

pub fn default_exclusions() -> Vec<String> {
    vec!["^pg_".to_string(), "^information_schema".to_string()]
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            exclude_schemas: default_exclusions(),
            include_views: false,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_profile_key")]
    pub default_profile: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, ConnectionProfile>,
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

fn default_version() -> u32 {
    1
}

fn default_profile_key() -> String {
    "default".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(default_profile_key(), ConnectionProfile::default());

        Self {
            version: 1,
            default_profile: default_profile_key(),
            profiles,
            discovery: DiscoverySettings::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path, honouring the override variable
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirFound)?;
        Ok(config_dir.join("schema-atlas").join("config.json"))
    }

    /// Load config from a file, or create a default one if it does not exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            log::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn profile(&self, key: &str) -> Result<&ConnectionProfile, ConfigError> {
        self.profiles
            .get(key)
            .ok_or_else(|| ConfigError::ProfileNotFound(key.to_string()))
    }

    pub fn default_profile(&self) -> Result<&ConnectionProfile, ConfigError> {
        self.profile(&self.default_profile)
    }

    /// Add or update a profile
    pub fn set_profile(&mut self, key: String, profile: ConnectionProfile) {
        self.profiles.insert(key, profile);
    }

    /// Remove a profile (cannot remove if it's the only one)
    pub fn remove_profile(&mut self, key: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(key) {
            return Err(ConfigError::ProfileNotFound(key.to_string()));
        }
        if self.profiles.len() <= 1 {
            return Err(ConfigError::LastProfile);
        }
        self.profiles.remove(key);

        // If we removed the default profile, switch to another one
        if self.default_profile == key {
            if let Some(first_key) = self.profiles.keys().next() {
                self.default_profile = first_key.clone();
            }
        }
        Ok(())
    }

    /// Resolve profile keys, defaulting to every configured profile
    pub fn select_profiles<'a>(
        &'a self,
        keys: &[String],
    ) -> Result<Vec<(&'a str, &'a ConnectionProfile)>, ConfigError> {
        if keys.is_empty() {
            return Ok(self
                .profiles
                .iter()
                .map(|(k, p)| (k.as_str(), p))
                .collect());
        }
        keys.iter()
            .map(|key| {
                self.profiles
                    .get_key_value(key)
                    .map(|(k, p)| (k.as_str(), p))
                    .ok_or_else(|| ConfigError::ProfileNotFound(key.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.default_profile, "default");
        assert!(config.profiles.contains_key("default"));
        assert_eq!(config.default_profile().unwrap().port, 5432);
        assert_eq!(
            config.discovery.exclude_schemas,
            vec!["^pg_", "^information_schema"]
        );
        assert!(!config.discovery.include_views);
    }

    #[test]
    fn test_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, config.version);
        assert_eq!(parsed.discovery, config.discovery);
    }

    #[test]
    fn test_partial_profile_uses_defaults() {
        let json = r#"{
            "profiles": { "sales": { "host": "db.internal", "database": "sales" } }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        let profile = config.profile("sales").unwrap();
        assert_eq!(profile.port, 5432);
        assert_eq!(profile.connect_timeout_secs, 10);
        assert!(profile.engine_name.is_none());
        assert_eq!(config.discovery, DiscoverySettings::default());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.default_profile, "default");

        let mut config = config;
        config.set_profile(
            "reporting".to_string(),
            ConnectionProfile {
                database: Some("reporting".to_string()),
                ..ConnectionProfile::default()
            },
        );
        config.save_to(&path).unwrap();

        let reloaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.profiles.len(), 2);
        assert_eq!(
            reloaded.profile("reporting").unwrap().database.as_deref(),
            Some("reporting")
        );
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_remove_profile() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.remove_profile("default"),
            Err(ConfigError::LastProfile)
        ));
        assert!(matches!(
            config.remove_profile("nope"),
            Err(ConfigError::ProfileNotFound(_))
        ));

        config.set_profile("other".to_string(), ConnectionProfile::default());
        config.remove_profile("default").unwrap();
        assert_eq!(config.default_profile, "other");
    }

    #[test]
    fn test_select_profiles() {
        let mut config = AppConfig::default();
        config.set_profile("b".to_string(), ConnectionProfile::default());

        let all = config.select_profiles(&[]).unwrap();
        assert_eq!(all.len(), 2);

        let one = config.select_profiles(&["b".to_string()]).unwrap();
        assert_eq!(one[0].0, "b");

        assert!(config.select_profiles(&["zzz".to_string()]).is_err());
    }
}
