use async_trait::async_trait;
use geocat_core::error::Result;
use serde_json::Value;

/// Port for executing search bodies against a backend index.
///
/// One raw-execution method covers the three shapes the catalog needs:
/// windowed hit searches, terms aggregations, and by-id lookups (a `term`
/// query on `_id`). Implementations may block the calling task for the
/// duration of a round-trip, must surface backend failures as typed errors,
/// and must not retry on their own.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute `body` against `index` and return the raw JSON response.
    ///
    /// `index` is a plain string and may carry wildcard routing patterns
    /// such as `datasets_*_acquisition-s1-iw_slc`.
    async fn search(&self, index: &str, body: &Value) -> Result<Value>;
}
