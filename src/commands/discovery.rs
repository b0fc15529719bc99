// ABOUTME: Discovery commands
// ABOUTME: Registers configured profiles as engines, discovers them and resolves dotted paths

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::config::{AppConfig, DiscoverySettings};
use crate::db::{Introspector, PostgresConnection, ReflectOptions};
use crate::error::Result;
use crate::models::CatalogSummary;
use crate::registry::{resolve_engine_name, split_path, Engine, NodeView, Registry};
use crate::ApiResponse;

/// Apply configured exclusions and reflection options to an engine
pub fn configure_engine(engine: &mut Engine, settings: &DiscoverySettings, include_views: bool) {
    engine.set_exclusions(settings.exclude_schemas.clone());
    engine.set_reflect_options(ReflectOptions {
        include_views: include_views || settings.include_views,
    });
}

/// Register one profile's handle and configure its engine.
///
/// A profile resolving to an engine name already taken by an earlier profile
/// replaces that engine and leaves a warning.
pub fn register_profile(
    registry: &mut Registry,
    key: &str,
    client: Arc<dyn Introspector>,
    engine_name: Option<&str>,
    settings: &DiscoverySettings,
    include_views: bool,
    warnings: &mut Vec<String>,
) -> Result<()> {
    let name = resolve_engine_name(engine_name, client.as_ref())?;
    if registry.contains(&name) {
        log::warn!("Profile '{}' replaces engine '{}'", key, name);
        warnings.push(format!("Profile '{}' replaces engine '{}'", key, name));
    }

    let engine = registry.register_engine(client, Some(name.as_str()))?;
    configure_engine(engine, settings, include_views);
    Ok(())
}

/// Connect every selected profile and register it.
///
/// Profiles that fail to connect or register are reported as warnings.
pub async fn connect_registry(
    config: &AppConfig,
    profile_keys: &[String],
    include_views: bool,
) -> anyhow::Result<(Registry, Vec<String>)> {
    let profiles = config.select_profiles(profile_keys)?;
    let mut registry = Registry::new();
    let mut warnings = Vec::new();

    for (key, profile) in profiles {
        let conn = match PostgresConnection::connect(profile).await {
            Ok(conn) => conn,
            Err(e) => {
                log::warn!("Skipping profile '{}': {}", key, e);
                warnings.push(format!("Profile '{}' skipped: {}", key, e));
                continue;
            }
        };

        if let Err(e) = register_profile(
            &mut registry,
            key,
            Arc::new(conn),
            profile.engine_name.as_deref(),
            &config.discovery,
            include_views,
            &mut warnings,
        ) {
            warnings.push(format!("Profile '{}' skipped: {}", key, e));
        }
    }

    if registry.engines().is_empty() {
        anyhow::bail!("No engines could be registered");
    }
    Ok((registry, warnings))
}

async fn discover_inner(
    config_path: &Path,
    profile_keys: &[String],
    include_views: bool,
) -> anyhow::Result<(CatalogSummary, Vec<String>)> {
    let config = AppConfig::load_from(config_path).context("Failed to load config")?;
    let (mut registry, warnings) = connect_registry(&config, profile_keys, include_views).await?;
    registry.discover_all().await?;
    Ok((registry.summary(), warnings))
}

/// Register and discover the selected profiles, returning the catalog tree
pub async fn discover(
    config_path: &Path,
    profile_keys: &[String],
    include_views: bool,
) -> ApiResponse<CatalogSummary> {
    match discover_inner(config_path, profile_keys, include_views).await {
        Ok((summary, warnings)) => {
            let info = format!(
                "Discovered {} tables across {} engines",
                summary.table_count(),
                summary.engines.len()
            );
            ApiResponse::success(summary)
                .with_warnings(warnings)
                .with_info(info)
        }
        Err(e) => ApiResponse::error(format!("Discovery failed: {:#}", e)),
    }
}

async fn describe_inner(
    config_path: &Path,
    path: &str,
    profile_keys: &[String],
    include_views: bool,
) -> anyhow::Result<(NodeView, Vec<String>)> {
    let (engine_name, _, _) = split_path(path)?;
    let config = AppConfig::load_from(config_path).context("Failed to load config")?;
    let (mut registry, warnings) = connect_registry(&config, profile_keys, include_views).await?;

    // Only the engine named by the path needs discovering
    registry.get_mut(engine_name)?.discover().await?;

    let view = registry.resolve(path)?.to_view();
    Ok((view, warnings))
}

/// Print the node at a dotted `engine.schema.table` path
pub async fn describe(
    config_path: &Path,
    path: &str,
    profile_keys: &[String],
    include_views: bool,
) -> ApiResponse<NodeView> {
    match describe_inner(config_path, path, profile_keys, include_views).await {
        Ok((view, warnings)) => ApiResponse::success(view).with_warnings(warnings),
        Err(e) => ApiResponse::error(format!("Describe failed: {:#}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::FakeIntrospector;

    #[test]
    fn test_configure_engine() {
        let mut registry = Registry::new();
        let engine = registry
            .register_engine(Arc::new(FakeIntrospector::new(Some("shop"))), None)
            .unwrap();

        let settings = DiscoverySettings {
            exclude_schemas: vec!["^tmp_".to_string()],
            include_views: false,
        };
        configure_engine(engine, &settings, true);

        assert_eq!(engine.exclusions(), ["^tmp_".to_string()]);
        assert!(engine.reflect_options().include_views);

        configure_engine(engine, &DiscoverySettings::default(), false);
        assert_eq!(engine.exclusions(), ["^pg_", "^information_schema"]);
        assert!(!engine.reflect_options().include_views);
    }

    #[test]
    fn test_register_profile_warns_on_engine_name_clash() {
        let mut registry = Registry::new();
        let mut warnings = Vec::new();
        let settings = DiscoverySettings::default();

        let first = Arc::new(FakeIntrospector::new(Some("app")).with_schema("public", &["orders"]));
        register_profile(&mut registry, "primary", first, None, &settings, false, &mut warnings).unwrap();
        assert!(warnings.is_empty());

        let second = Arc::new(FakeIntrospector::new(Some("staging")));
        register_profile(&mut registry, "replica", second, Some("app"), &settings, true, &mut warnings)
            .unwrap();

        assert_eq!(warnings, vec!["Profile 'replica' replaces engine 'app'"]);
        assert_eq!(registry.engines().list_item_keys(), vec!["app"]);
        assert!(registry["app"].reflect_options().include_views);
    }

    #[test]
    fn test_register_profile_without_name_fails() {
        let mut registry = Registry::new();
        let mut warnings = Vec::new();
        let err = register_profile(
            &mut registry,
            "anonymous",
            Arc::new(FakeIntrospector::new(None)),
            None,
            &DiscoverySettings::default(),
            false,
            &mut warnings,
        )
        .unwrap_err();

        assert!(err.to_string().starts_with("Cannot detect engine name"));
        assert!(registry.engines().is_empty());
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_describe_rejects_empty_path_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        for bad in ["", ".public", "shop..orders"] {
            let response = describe(&path, bad, &[], false).await;
            assert!(!response.success);
            assert_eq!(
                response.messages.error,
                vec![format!("Describe failed: Invalid registry path: '{}'", bad)]
            );
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_connect_registry_rejects_unknown_profile() {
        let config = AppConfig::default();
        let err = connect_registry(&config, &["missing".to_string()], false)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile not found: missing");
    }

    #[tokio::test]
    async fn test_describe_reports_bad_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[]").unwrap();

        let response = describe(&path, "shop.public", &[], false).await;
        assert!(!response.success);
        assert!(response.messages.error[0].starts_with("Describe failed: Failed to load config"));
    }
}
