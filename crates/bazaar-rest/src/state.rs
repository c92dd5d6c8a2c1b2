//! Application state for Axum handlers.

use bazaar_config::PricingConfig;
use bazaar_core::HealthCheck;
use bazaar_security::PolicyAuthorizer;
use bazaar_service::{AuthService, CatalogService, UserService};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: Arc<dyn CatalogService>,
    pub user_service: Arc<dyn UserService>,
    pub auth_service: Arc<dyn AuthService>,
    pub authorizer: Arc<PolicyAuthorizer>,
    pub pricing: Arc<PricingConfig>,
    /// Dependencies probed by `/ready`.
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
    /// Mark the `access_token` cookie `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    /// Creates a new application state with the standard authorization
    /// policies and no readiness probes.
    pub fn new(
        catalog_service: Arc<dyn CatalogService>,
        user_service: Arc<dyn UserService>,
        auth_service: Arc<dyn AuthService>,
        pricing: Arc<PricingConfig>,
    ) -> Self {
        Self {
            catalog_service,
            user_service,
            auth_service,
            authorizer: Arc::new(PolicyAuthorizer::standard()),
            pricing,
            health_checks: Vec::new(),
            secure_cookies: false,
        }
    }

    #[must_use]
    pub fn with_health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.health_checks.push(check);
        self
    }

    #[must_use]
    pub const fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
