//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.
//!
//! The built chains page is cached and rebuilt by the first request that
//! arrives after the revalidation window has elapsed. Only one rebuild runs
//! at a time: requests arriving meanwhile get the stale page, or wait for
//! the first build when nothing is cached yet. After a failed rebuild the
//! stale page is served until the window elapses again.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

use crate::export::DEFAULT_CSV_FILENAME;
use crate::page::{build_chains_page, ChainsPage, PageError, PageSettings};
use crate::sources::DataSource;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream data for page builds
    pub source: Arc<dyn DataSource>,
    /// Page build tunables
    pub settings: PageSettings,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    cache: Arc<PageCache>,
}

#[derive(Default)]
struct PageCache {
    page: RwLock<Option<Arc<ChainsPage>>>,
    rebuild: Mutex<RebuildState>,
}

#[derive(Default)]
struct RebuildState {
    /// Time and message of the last failed build, cleared on success
    last_failure: Option<(Instant, String)>,
}

impl AppState {
    pub fn new(source: Arc<dyn DataSource>, settings: PageSettings, config: ApiConfig) -> Self {
        Self {
            source,
            settings,
            config: Arc::new(config),
            start_time: Instant::now(),
            cache: Arc::new(PageCache::default()),
        }
    }

    /// Current page, rebuilt when the cached one is older than the
    /// revalidation window.
    ///
    /// A failed rebuild falls back to the stale page when there is one.
    pub async fn page(&self) -> Result<Arc<ChainsPage>, PageError> {
        if let Some(page) = self.fresh_page().await {
            return Ok(page);
        }

        let waiting_since = Instant::now();
        let mut rebuild = match self.cache.rebuild.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                if let Some(stale) = self.cached_page().await {
                    tracing::debug!("Rebuild in progress, serving stale page");
                    return Ok(stale);
                }
                self.cache.rebuild.lock().await
            }
        };

        // Another request may have rebuilt while we waited
        if let Some(page) = self.fresh_page().await {
            return Ok(page);
        }

        if let Some((failed_at, error)) = &rebuild.last_failure {
            if *failed_at >= waiting_since || failed_at.elapsed() < self.config.revalidate_window() {
                return match self.cached_page().await {
                    Some(stale) => Ok(stale),
                    None => Err(PageError::Unavailable(error.clone())),
                };
            }
        }

        match build_chains_page(self.source.as_ref(), &self.settings).await {
            Ok(page) => {
                let page = Arc::new(page);
                *self.cache.page.write().await = Some(Arc::clone(&page));
                rebuild.last_failure = None;
                Ok(page)
            }
            Err(e) => {
                rebuild.last_failure = Some((Instant::now(), e.to_string()));
                match self.cached_page().await {
                    Some(stale) => {
                        tracing::warn!(error = %e, age_seconds = stale.age_seconds(), "Rebuild failed, serving stale page");
                        Ok(stale)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Cached page regardless of age
    pub async fn cached_page(&self) -> Option<Arc<ChainsPage>> {
        self.cache.page.read().await.clone()
    }

    async fn fresh_page(&self) -> Option<Arc<ChainsPage>> {
        let window = self.config.revalidate_secs as i64;
        self.cached_page()
            .await
            .filter(|page| page.age_seconds() < window)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins, any origin when empty
    pub cors_origins: Vec<String>,
    /// Seconds a built page is served before it is rebuilt
    pub revalidate_secs: u64,
    /// File name offered by the CSV export
    pub csv_filename: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            cors_origins: Vec::new(),
            revalidate_secs: 300,
            csv_filename: DEFAULT_CSV_FILENAME.to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn revalidate_window(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}
