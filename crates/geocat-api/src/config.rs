use std::env;

use geocat_query::paging::PageLimits;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub es_url: String,
    /// Base index (or alias) holding the catalog documents. Per-dataset
    /// field queries route through `"<index>_*_<dataset>"` patterns built
    /// from this value.
    pub index: String,
    pub page_limits: PageLimits,
    /// When set, requests must present this key in `X-API-Key`.
    pub api_key: Option<String>,
    pub cors_origin: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("GEOCAT_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080);

        let es_url =
            env::var("GEOCAT_ES_URL").unwrap_or_else(|_| "http://127.0.0.1:9200".to_string());

        let index = env::var("GEOCAT_INDEX").unwrap_or_else(|_| "datasets".to_string());

        let defaults = PageLimits::default();
        let page_limits = PageLimits {
            default_page_size: env::var("GEOCAT_DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_page_size),
            max_page_size: env::var("GEOCAT_MAX_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_page_size),
        };

        let api_key = env::var("GEOCAT_API_KEY").ok().filter(|k| !k.is_empty());
        let cors_origin = env::var("GEOCAT_CORS_ORIGIN").ok();

        Self { port, es_url, index, page_limits, api_key, cors_origin }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
