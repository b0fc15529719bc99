// ABOUTME: Connection-related commands
// ABOUTME: Handles PostgreSQL connection testing for a configured profile

use std::path::Path;

use crate::config::AppConfig;
use crate::db::{Introspector, PostgresConnection};
use crate::models::HealthStatus;
use crate::ApiResponse;

/// Test connection to PostgreSQL using a configured profile
pub async fn test_connection(config_path: &Path, profile: Option<&str>) -> ApiResponse<HealthStatus> {
    let config = match AppConfig::load_from(config_path) {
        Ok(c) => c,
        Err(e) => return ApiResponse::error(format!("Failed to load config: {}", e)),
    };

    let selected = match profile {
        Some(key) => config.profile(key),
        None => config.default_profile(),
    };
    let profile = match selected {
        Ok(p) => p,
        Err(e) => return ApiResponse::error(format!("No usable connection profile: {}", e)),
    };

    let conn = match PostgresConnection::connect(profile).await {
        Ok(conn) => conn,
        Err(e) => return ApiResponse::error(format!("Failed to connect: {}", e)),
    };

    match conn.server_version().await {
        Ok(version) => ApiResponse::success(HealthStatus {
            connected: true,
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            platform: Some(std::env::consts::OS.to_string()),
            server_version: Some(version),
        }),
        Err(e) => ApiResponse::error(format!("Connection test failed: {}", e)),
    }
}
