//! Data Transfer Objects
//!
//! Query parameters and response bodies of the API endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{ChainSummary, ExtraTvlToggles};
use crate::api::error::{ApiError, ApiResult};
use crate::present::DisplayMode;

/// `GET /api/v1/chains` parameters
#[derive(Debug, Default, Deserialize)]
pub struct ChainsParams {
    /// Comma-separated extra-TVL categories, e.g. `staking,pool2`
    #[serde(default)]
    pub include: Option<String>,
}

impl ChainsParams {
    /// Parsed toggles, rejecting unknown categories
    pub fn toggles(&self) -> ApiResult<ExtraTvlToggles> {
        match self.include.as_deref() {
            Some(include) => ExtraTvlToggles::try_parse_list(include).map_err(ApiError::Validation),
            None => Ok(ExtraTvlToggles::new()),
        }
    }
}

/// Chains table response
#[derive(Debug, Serialize)]
pub struct ChainsResponse {
    pub built_at: DateTime<Utc>,
    /// Sum of the listed TVLs
    pub total_tvl: f64,
    pub chains: Vec<ChainSummary>,
}

/// `GET /api/v1/chains/dominance` parameters
#[derive(Debug, Default, Deserialize)]
pub struct DominanceParams {
    #[serde(default)]
    pub mode: Option<String>,
}

impl DominanceParams {
    pub fn mode(&self) -> ApiResult<DisplayMode> {
        match self.mode.as_deref() {
            None => Ok(DisplayMode::default()),
            Some(mode) => mode.parse().map_err(ApiError::Validation),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy", "stale" or "empty"
    pub status: String,
    /// Chains in the cached page
    pub chains: usize,
    /// Age of the cached page, absent before the first build
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_age_seconds: Option<i64>,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_parsing() {
        let params = ChainsParams {
            include: Some("Staking, pool2".to_string()),
        };
        let toggles = params.toggles().unwrap();
        assert!(toggles.is_enabled("staking"));
        assert!(toggles.is_enabled("pool2"));

        let params = ChainsParams {
            include: Some("staking,doublecounted".to_string()),
        };
        assert!(matches!(params.toggles(), Err(ApiError::Validation(_))));

        assert!(ChainsParams::default().toggles().unwrap().is_empty());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(DominanceParams::default().mode().unwrap(), DisplayMode::Percent);

        let params = DominanceParams {
            mode: Some("absolute".to_string()),
        };
        assert_eq!(params.mode().unwrap(), DisplayMode::Absolute);

        let params = DominanceParams {
            mode: Some("log".to_string()),
        };
        assert!(params.mode().is_err());
    }
}
