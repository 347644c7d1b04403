use geocat_query::paging::PageLimits;
use geocat_query::Catalog;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub index: String,
    pub page_limits: PageLimits,
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        index: String,
        page_limits: PageLimits,
        api_key: Option<String>,
    ) -> Self {
        Self { catalog, index, page_limits, api_key }
    }
}
