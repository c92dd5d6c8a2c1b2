//! Application builder.

use crate::{di::AppModuleBuilder, startup};
use bazaar_config::AppConfig;
use bazaar_core::{BazaarError, BazaarResult};
use bazaar_repository::create_pool;
use bazaar_rest::{create_router, AppState};
use bazaar_service::RedisCacheService;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Builds the server from configuration and runs it until shutdown.
pub struct AppBuilder {
    config: Option<AppConfig>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { config: None }
    }

    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Connects to MySQL and the cache, applies migrations and the demo seed
    /// if enabled, then serves HTTP until a shutdown signal arrives.
    pub async fn run(self) -> BazaarResult<()> {
        let config = self.config.unwrap_or_default();

        let db_pool = create_pool(&config.database).await?;
        if config.database.run_migrations {
            db_pool.run_migrations().await?;
        }

        let mut builder = AppModuleBuilder::new()
            .with_database_pool(db_pool.clone())
            .with_cache_config(config.cache.clone())
            .with_security_config(config.security.clone())
            .with_pricing(config.pricing.clone());

        if config.redis.enabled {
            let pool = RedisCacheService::create_pool(&config.redis.url, config.redis.pool_size)?;
            let redis = Arc::new(RedisCacheService::new(
                Arc::new(pool),
                config.cache.key_prefix.clone(),
            ));
            info!("Using Redis cache at {}", config.redis.url);
            builder = builder.with_cache(redis.clone()).with_cache_health_check(redis);
        } else {
            warn!("Redis disabled, caching in process memory only");
        }

        let module = builder.build()?;

        if config.database.seed {
            let report = module.seeder().seed().await?;
            info!(
                categories = report.categories,
                questions = report.questions,
                "Demo catalog seeded"
            );
        }

        let state = module
            .health_checks()
            .into_iter()
            .fold(
                AppState::new(
                    module.catalog_service(),
                    module.user_service(),
                    module.auth_service(),
                    module.pricing(),
                ),
                AppState::with_health_check,
            )
            .with_secure_cookies(config.security.cookie_secure);

        let router = create_router(state, &config.server);

        let addr = config.server.addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| BazaarError::Internal(format!("Failed to bind {addr}: {e}")))?;

        startup::print_startup_info(&addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| BazaarError::Internal(format!("HTTP server error: {e}")))?;

        db_pool.close().await;
        info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
