//! Pricing settings controller.

use crate::{
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{extract::State, routing::get, Router};
use bazaar_service::PricingResponse;

pub fn router() -> Router<AppState> {
    Router::new().route("/pricing", get(get_pricing))
}

/// Marketplace commission and return settings.
#[utoipa::path(
    get,
    path = "/api/v1/pricing",
    tag = "pricing",
    responses(
        (status = 200, description = "Current pricing settings", body = PricingResponse)
    )
)]
pub async fn get_pricing(State(state): State<AppState>) -> ApiResult<PricingResponse> {
    ok(PricingResponse::from(state.pricing.as_ref()))
}
