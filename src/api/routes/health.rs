//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (a page can be served)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once a page is cached or can be built.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.cached_page().await.is_some() {
        return StatusCode::OK;
    }

    match state.page().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// GET /health
///
/// Cache status without triggering a build.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cached = state.cached_page().await;

    let (status, chains, page_age_seconds) = match &cached {
        None => ("empty", 0, None),
        Some(page) => {
            let age = page.age_seconds();
            let status = if age < state.config.revalidate_secs as i64 {
                "healthy"
            } else {
                "stale"
            };
            (status, page.chains.len(), Some(age))
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        chains,
        page_age_seconds,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let status = liveness().await;
        assert_eq!(status, StatusCode::OK);
    }
}
