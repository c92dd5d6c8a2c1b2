//! Read-only view of the order and returns pricing settings.

use bazaar_config::PricingConfig;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Marketplace pricing parameters as configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricingResponse {
    /// Share of each sale kept by the marketplace.
    pub commission_percent: f64,
    /// Days after delivery during which a return is accepted.
    pub return_window_days: u32,
    pub restocking_fee_percent: f64,
}

impl From<&PricingConfig> for PricingResponse {
    fn from(config: &PricingConfig) -> Self {
        Self {
            commission_percent: config.commission_percent,
            return_window_days: config.return_window_days,
            restocking_fee_percent: config.restocking_fee_percent,
        }
    }
}
