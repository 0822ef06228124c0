//! Chain Routes
//!
//! - GET /api/v1/chains - Chain summaries, extra TVL applied via `include`
//! - GET /api/v1/chains/dominance - Stacked dominance chart model
//! - GET /api/v1/chains/pie - Latest top-N breakdown

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{ChainsParams, ChainsResponse, DominanceParams};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::present::{DominanceChart, PieChart};

/// GET /api/v1/chains
pub async fn list_chains(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChainsParams>,
) -> ApiResult<Json<ChainsResponse>> {
    let toggles = params.toggles()?;
    let page = state.page().await?;

    let chains = page.summaries_with(&toggles);
    let total_tvl = chains.iter().map(|c| c.tvl).sum();

    Ok(Json(ChainsResponse {
        built_at: page.built_at,
        total_tvl,
        chains,
    }))
}

/// GET /api/v1/chains/dominance
pub async fn dominance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DominanceParams>,
) -> ApiResult<Json<DominanceChart>> {
    let mode = params.mode()?;
    let page = state.page().await?;
    Ok(Json(page.dominance(mode)))
}

/// GET /api/v1/chains/pie
pub async fn pie(State(state): State<Arc<AppState>>) -> ApiResult<Json<PieChart>> {
    let page = state.page().await?;
    Ok(Json(page.pie()))
}
