//! Configuration loader with layered sources.

use crate::AppConfig;
use bazaar_core::BazaarError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Environment variable prefix; nested keys use `__`, e.g.
/// `BAZAAR__DATABASE__URL`.
pub const ENV_PREFIX: &str = "BAZAAR";

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Loads and holds the application configuration.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Loads configuration from `config_dir`.
    ///
    /// Sources, later ones winning:
    /// 1. `default.toml`
    /// 2. `{environment}.toml`, where the environment comes from
    ///    `BAZAAR_ENVIRONMENT` (default `development`)
    /// 3. `local.toml`
    /// 4. `BAZAAR__*` environment variables
    pub fn new(config_dir: impl Into<String>) -> Result<Self, BazaarError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from `./config`.
    pub fn from_default_location() -> Result<Self, BazaarError> {
        Self::new("./config")
    }

    /// Returns a snapshot of the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Re-reads every source.
    pub async fn reload(&self) -> Result<(), BazaarError> {
        let fresh = Self::load_config(&self.config_dir)?;
        *self.config.write().await = fresh;
        info!("Configuration reloaded");
        Ok(())
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, BazaarError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file loaded: {}", e);
        }

        let environment =
            std::env::var("BAZAAR_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();
        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config file: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error_to_bazaar_error)?;

        validate_config(&app_config)?;
        Ok(app_config)
    }

    /// Reads a single value by dotted path, e.g. `cache.category_ttl_secs`.
    pub async fn get_value<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let config = self.config.read().await;
        let json = serde_json::to_value(&*config).ok()?;

        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }

        serde_json::from_value(current.clone()).ok()
    }
}

/// Rejects configurations the server cannot run with.
pub fn validate_config(config: &AppConfig) -> Result<(), BazaarError> {
    if config.app.is_production() && config.security.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using default JWT secret in production! This is a security risk.");
    }

    if config.database.url.is_empty() {
        return Err(BazaarError::Configuration("Database URL is required".to_string()));
    }

    if config.cache.category_ttl_secs == 0 || config.cache.user_auth_ttl_secs == 0 {
        return Err(BazaarError::Configuration(
            "Cache TTLs must be positive".to_string(),
        ));
    }

    if config.security.token_expiration_minutes <= 0 {
        return Err(BazaarError::Configuration(
            "security.token_expiration_minutes must be positive".to_string(),
        ));
    }

    Ok(())
}

fn config_error_to_bazaar_error(err: ConfigError) -> BazaarError {
    BazaarError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.category_ttl_secs, 3600);
        assert_eq!(config.cache.user_auth_ttl_secs, 600);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_ttl() {
        let mut config = AppConfig::default();
        config.cache.user_auth_ttl_secs = 0;
        assert!(matches!(
            validate_config(&config),
            Err(BazaarError::Configuration(_))
        ));
    }

    #[test]
    fn test_validation_rejects_non_positive_token_window() {
        let mut config = AppConfig::default();
        config.security.token_expiration_minutes = 0;
        assert!(validate_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_loads_toml_layers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            r#"
[cache]
key_prefix = "test:"
category_ttl_secs = 120
user_auth_ttl_secs = 30
lock_ttl_ms = 1000
lock_wait_ms = 100
lock_poll_interval_ms = 10

[pricing]
commission_percent = 7.5
return_window_days = 30
restocking_fee_percent = 5.0
"#,
        )
        .unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy().to_string()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.cache.category_ttl_secs, 120);
        assert_eq!(config.pricing.return_window_days, 30);
        assert_eq!(config.server.port, 8080);

        let ttl: Option<u64> = loader.get_value("cache.user_auth_ttl_secs").await;
        assert_eq!(ttl, Some(30));
    }
}
