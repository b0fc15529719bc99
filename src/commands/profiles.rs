// ABOUTME: Profile management commands
// ABOUTME: List, add and remove PostgreSQL connection profiles in the config file

use std::path::Path;

use serde::Serialize;

use crate::cli::NewProfile;
use crate::config::{AppConfig, ConnectionProfile};
use crate::ApiResponse;

/// Public connection profile (without password)
#[derive(Debug, Serialize)]
pub struct ProfilePublic {
    pub key: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub database: Option<String>,
    #[serde(rename = "engineName")]
    pub engine_name: Option<String>,
    #[serde(rename = "isDefault")]
    pub is_default: bool,
}

impl ProfilePublic {
    fn from_profile(key: &str, profile: &ConnectionProfile, default_key: &str) -> Self {
        Self {
            key: key.to_string(),
            host: profile.host.clone(),
            port: profile.port,
            username: profile.username.clone(),
            database: profile.database.clone(),
            engine_name: profile.engine_name.clone(),
            is_default: key == default_key,
        }
    }
}

/// Get all profiles (without passwords)
pub fn list_profiles(config_path: &Path) -> ApiResponse<Vec<ProfilePublic>> {
    let config = match AppConfig::load_from(config_path) {
        Ok(c) => c,
        Err(e) => return ApiResponse::error(format!("Failed to load config: {}", e)),
    };

    let profiles = config
        .profiles
        .iter()
        .map(|(key, p)| ProfilePublic::from_profile(key, p, &config.default_profile))
        .collect();
    ApiResponse::success(profiles)
}

/// Add or replace a profile
pub fn add_profile(config_path: &Path, new_profile: NewProfile) -> ApiResponse<ProfilePublic> {
    let mut config = match AppConfig::load_from(config_path) {
        Ok(c) => c,
        Err(e) => return ApiResponse::error(format!("Failed to load config: {}", e)),
    };

    let key = new_profile.name;
    let replaced = config.profiles.contains_key(&key);
    let profile = ConnectionProfile {
        host: new_profile.host,
        port: new_profile.port,
        username: new_profile
            .username
            .unwrap_or_else(|| ConnectionProfile::default().username),
        password: new_profile.password,
        database: new_profile.database,
        engine_name: new_profile.engine_name,
        ..ConnectionProfile::default()
    };

    config.set_profile(key.clone(), profile);
    if new_profile.default {
        config.default_profile = key.clone();
    }

    if let Err(e) = config.save_to(config_path) {
        return ApiResponse::error(format!("Failed to save profile: {}", e));
    }
    log::info!("Saved profile '{}'", key);

    let public = ProfilePublic::from_profile(&key, &config.profiles[&key], &config.default_profile);
    let response = ApiResponse::success(public);
    if replaced {
        response.with_info(format!("Replaced existing profile '{}'", key))
    } else {
        response
    }
}

/// Remove a profile (the last one cannot be removed)
pub fn remove_profile(config_path: &Path, key: &str) -> ApiResponse<()> {
    let mut config = match AppConfig::load_from(config_path) {
        Ok(c) => c,
        Err(e) => return ApiResponse::error(format!("Failed to load config: {}", e)),
    };

    if let Err(e) = config.remove_profile(key) {
        return ApiResponse::error(format!("Failed to remove profile: {}", e));
    }

    match config.save_to(config_path) {
        Ok(_) => ApiResponse::success(()),
        Err(e) => ApiResponse::error(format!("Failed to save config: {}", e)),
    }
}
