//! Shaping of raw backend responses into the paginated result contract.

use geocat_core::error::{CatalogError, Result};
use geocat_core::models::DatasetDocument;
use serde::Serialize;
use serde_json::Value;

use crate::paging::PageWindow;

/// One page of results plus the full match count. `total` always counts
/// every match, not just the returned slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub total: usize,
    pub items: Vec<T>,
}

/// Extract bucket keys from a terms-aggregation response, in the backend's
/// own bucket order. Aggregations return the full bucket list up to the
/// size cap rather than a window, so the page slice is applied here, after
/// `total` is taken from the complete list.
pub fn aggregation_page(
    response: &Value,
    bucket: &str,
    window: PageWindow,
) -> Result<Paginated<String>> {
    let buckets = response
        .pointer(&format!("/aggregations/{bucket}/buckets"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            CatalogError::invalid_response(format!("missing aggregation buckets: {bucket}"))
        })?;

    let keys: Vec<String> = buckets.iter().map(bucket_key).collect::<Result<_>>()?;
    let total = keys.len();
    let items = keys.into_iter().skip(window.offset).take(window.page_size).collect();
    Ok(Paginated { total, items })
}

/// A page of raw documents from a hit-list response. Windowing was pushed
/// to the backend, so the hits arrive already sliced; `total` is the
/// backend-reported match count.
pub fn hit_page(response: &Value) -> Result<Paginated<Value>> {
    let total = total_hits(response)?;
    let items = hit_sources(response)?.into_iter().cloned().collect();
    Ok(Paginated { total, items })
}

/// A page of granule IDs from an id-projection hit response.
pub fn id_page(response: &Value) -> Result<Paginated<String>> {
    let total = total_hits(response)?;
    let items = hit_sources(response)?
        .into_iter()
        .map(|source| {
            source
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| CatalogError::invalid_response("hit without an id field"))
        })
        .collect::<Result<_>>()?;
    Ok(Paginated { total, items })
}

/// Decode the first hit as a catalog document. `None` when nothing matched;
/// "not found" is a valid outcome, not an error.
pub fn first_document(response: &Value) -> Result<Option<DatasetDocument>> {
    let sources = hit_sources(response)?;
    let Some(source) = sources.first() else {
        return Ok(None);
    };
    serde_json::from_value((*source).clone())
        .map(Some)
        .map_err(|e| CatalogError::invalid_response(format!("document decode failed: {e}")))
}

fn bucket_key(bucket: &Value) -> Result<String> {
    match bucket.get("key") {
        Some(Value::String(key)) => Ok(key.clone()),
        // Numeric keys (e.g. version fields) stringify.
        Some(other) => Ok(other.to_string()),
        None => Err(CatalogError::invalid_response("aggregation bucket without a key")),
    }
}

/// Match count from the response header. Accepts both the current object
/// form (`{"value": n, "relation": "eq"}`) and the bare numeric form older
/// backends report.
fn total_hits(response: &Value) -> Result<usize> {
    let total = response
        .pointer("/hits/total")
        .ok_or_else(|| CatalogError::invalid_response("missing hits.total"))?;
    let value = match total {
        Value::Number(_) => total.as_u64(),
        Value::Object(_) => total.get("value").and_then(Value::as_u64),
        _ => None,
    };
    value
        .map(|v| v as usize)
        .ok_or_else(|| CatalogError::invalid_response("unreadable hits.total"))
}

fn hit_sources(response: &Value) -> Result<Vec<&Value>> {
    response
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .ok_or_else(|| CatalogError::invalid_response("missing hits array"))?
        .iter()
        .map(|hit| {
            hit.get("_source")
                .ok_or_else(|| CatalogError::invalid_response("hit without _source"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window(offset: usize, page_size: usize) -> PageWindow {
        PageWindow { offset, page_size }
    }

    fn agg_response() -> Value {
        json!({
            "took": 3,
            "hits": {"total": {"value": 5, "relation": "eq"}, "hits": []},
            "aggregations": {"types": {"buckets": [
                {"key": "acquisition", "doc_count": 3},
                {"key": "aoi", "doc_count": 2},
            ]}}
        })
    }

    #[test]
    fn aggregation_total_counts_all_buckets_before_slicing() {
        let page = aggregation_page(&agg_response(), "types", window(1, 10)).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items, vec!["aoi"]);
    }

    #[test]
    fn aggregation_page_slice_can_be_empty() {
        let page = aggregation_page(&agg_response(), "types", window(5, 10)).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.items.is_empty());
    }

    #[test]
    fn empty_aggregation_is_a_valid_empty_page() {
        let response = json!({
            "hits": {"total": {"value": 0, "relation": "eq"}, "hits": []},
            "aggregations": {"types": {"buckets": []}}
        });
        let page = aggregation_page(&response, "types", window(0, 10)).unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn missing_bucket_name_is_a_malformed_response() {
        let err = aggregation_page(&agg_response(), "datasets", window(0, 10)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse { .. }));
    }

    #[test]
    fn hit_page_reports_backend_total_not_page_length() {
        let response = json!({
            "hits": {
                "total": {"value": 812, "relation": "eq"},
                "hits": [
                    {"_id": "a", "_source": {"id": "a"}},
                    {"_id": "b", "_source": {"id": "b"}},
                ],
            }
        });
        let page = hit_page(&response).unwrap();
        assert_eq!(page.total, 812);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn legacy_numeric_total_is_accepted() {
        let response = json!({
            "hits": {"total": 7, "hits": [{"_id": "a", "_source": {"id": "a"}}]}
        });
        assert_eq!(id_page(&response).unwrap().total, 7);
    }

    #[test]
    fn id_page_extracts_projected_ids() {
        let response = json!({
            "hits": {"total": {"value": 2, "relation": "eq"}, "hits": [
                {"_id": "x", "_source": {"id": "x"}},
                {"_id": "y", "_source": {"id": "y"}},
            ]}
        });
        assert_eq!(id_page(&response).unwrap().items, vec!["x", "y"]);
    }

    #[test]
    fn first_document_is_none_on_zero_hits() {
        let response = json!({"hits": {"total": {"value": 0, "relation": "eq"}, "hits": []}});
        assert!(first_document(&response).unwrap().is_none());
    }

    #[test]
    fn first_document_decodes_the_granule() {
        let response = json!({
            "hits": {"total": {"value": 1, "relation": "eq"}, "hits": [
                {"_id": "g1", "_source": {"id": "g1", "dataset_type": "acquisition"}},
            ]}
        });
        let doc = first_document(&response).unwrap().unwrap();
        assert_eq!(doc.id, "g1");
        assert_eq!(doc.dataset_type.as_deref(), Some("acquisition"));
    }

    #[test]
    fn garbage_response_is_a_backend_error_not_a_panic() {
        let err = hit_page(&json!({"error": "index_not_found_exception"})).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse { .. }));
    }
}
