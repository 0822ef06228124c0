//! Export Routes
//!
//! - GET /api/v1/chains/export - Stacked dataset as a CSV attachment

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/v1/chains/export
pub async fn export_csv(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let page = state.page().await?;
    let body = page.to_csv()?;

    let disposition = format!("attachment; filename=\"{}\"", state.config.csv_filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
