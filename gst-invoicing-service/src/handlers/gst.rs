use axum::{extract::State, Json};
use gst_core::{standard_slabs, RateSlab};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::startup::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GstRatesResponse {
    pub rates: Vec<RateSlab>,
    pub default_rate: Decimal,
}

/// Slab menu for the product picker. Needs no user context.
pub async fn gst_rates(State(state): State<AppState>) -> Json<GstRatesResponse> {
    Json(GstRatesResponse {
        rates: standard_slabs(),
        default_rate: state.calculator.default_rate(),
    })
}
