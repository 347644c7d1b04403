//! Search DSL construction for catalog queries.
//!
//! Every builder is a pure, deterministic function from logical parameters
//! to a backend query body. Absent optional filters are omitted from the
//! query tree entirely; an empty term list never becomes an always-false
//! query. Caller-supplied term filters are composed in insertion order.

use serde_json::{json, Map, Value};

use crate::paging::PageWindow;
use crate::polygon::Polygon;

/// Upper bound requested for aggregation buckets. The backend treats the
/// size as a literal cap; the legacy `0 == unbounded` convention is gone,
/// so a generous explicit value keeps type/dataset lists from silently
/// truncating.
pub const MAX_AGG_BUCKETS: usize = 10_000;

/// Keyword sub-field carrying the dataset type (category) of a granule.
pub const TYPE_FIELD: &str = "dataset_type.keyword";
/// Keyword sub-field carrying the dataset (collection) name of a granule.
pub const DATASET_FIELD: &str = "dataset.keyword";

/// A terms-aggregation body plus the bucket name it aggregates under.
#[derive(Debug, Clone, PartialEq)]
pub struct AggQuery {
    pub bucket: &'static str,
    pub body: Value,
}

/// Optional temporal/spatial restriction applied to hit-list queries.
/// Time bounds pass through to the backend verbatim as ISO-8601 strings.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Keep documents with `starttime >= start_time`.
    pub start_time: Option<String>,
    /// Keep documents with `endtime < end_time`.
    pub end_time: Option<String>,
    /// Keep documents whose `location` intersects the polygon.
    pub polygon: Option<Polygon>,
}

/// Temporal/spatial envelope extracted from an overlap reference document.
/// Each field may be absent independently; absent fields contribute no
/// predicate.
#[derive(Debug, Clone, Default)]
pub struct OverlapEnvelope {
    pub starttime: Option<String>,
    pub endtime: Option<String>,
    pub location: Option<Value>,
}

/// Distinct dataset types across an index.
pub fn types_query() -> AggQuery {
    terms_aggregation("types", TYPE_FIELD, None)
}

/// Distinct dataset (collection) names across an index.
pub fn datasets_query() -> AggQuery {
    terms_aggregation("datasets", DATASET_FIELD, None)
}

/// Distinct dataset names restricted to one dataset type.
pub fn datasets_by_type_query(dataset_type: &str) -> AggQuery {
    terms_aggregation("datasets", DATASET_FIELD, Some(term(TYPE_FIELD, &json!(dataset_type))))
}

/// Distinct dataset types restricted to one dataset name.
pub fn types_by_dataset_query(dataset: &str) -> AggQuery {
    terms_aggregation("types", TYPE_FIELD, Some(term(DATASET_FIELD, &json!(dataset))))
}

/// Granule IDs within a dataset, optionally restricted in time and space.
pub fn ids_by_dataset_query(dataset: &str, window: PageWindow, filter: &SearchFilter) -> Value {
    scoped_ids_query(DATASET_FIELD, dataset, window, filter)
}

/// Granule IDs within a dataset type, optionally restricted in time and space.
pub fn ids_by_type_query(dataset_type: &str, window: PageWindow, filter: &SearchFilter) -> Value {
    scoped_ids_query(TYPE_FIELD, dataset_type, window, filter)
}

/// Single-document lookup by backend `_id`.
pub fn id_query(id: &str) -> Value {
    json!({"query": term("_id", &json!(id))})
}

/// Arbitrary-field projection query: a conjunction of caller-supplied term
/// filters (insertion order preserved) plus the optional time/polygon
/// restrictions. Results sort by `starttime` descending; the sort is fixed
/// and not exposed as a parameter.
pub fn fields_query(
    terms: &[(String, Value)],
    return_fields: &[String],
    window: PageWindow,
    filter: &SearchFilter,
) -> Value {
    let mut clauses: Vec<Value> =
        terms.iter().map(|(field, value)| term(&normalize_field(field), value)).collect();
    clauses.extend(filter_clauses(filter));

    json!({
        "query": conjunction(clauses),
        "_source": return_fields,
        "sort": [{"starttime": {"order": "desc"}}],
        "from": window.offset,
        "size": window.page_size,
        "track_total_hits": true,
    })
}

/// Candidates overlapping a reference envelope: overlap means
/// `candidate.endtime > reference.starttime` AND
/// `candidate.starttime < reference.endtime`, each half present only when
/// the reference carries that field, plus geo-intersection with the
/// reference footprint when one exists. Extra term filters are ANDed in.
pub fn overlaps_query(
    envelope: &OverlapEnvelope,
    terms: &[(String, Value)],
    return_fields: &[String],
    window: PageWindow,
) -> Value {
    let mut must: Vec<Value> =
        terms.iter().map(|(field, value)| term(&normalize_field(field), value)).collect();
    if let Some(starttime) = &envelope.starttime {
        must.push(range("endtime", "gt", &json!(starttime)));
    }
    if let Some(endtime) = &envelope.endtime {
        must.push(range("starttime", "lt", &json!(endtime)));
    }

    let mut bool_body = Map::new();
    if !must.is_empty() {
        bool_body.insert("must".to_string(), Value::Array(must));
    }
    if let Some(location) = &envelope.location {
        // The reference footprint is passed through verbatim as the shape.
        bool_body.insert("filter".to_string(), json!([geo_shape("location", location.clone())]));
    }

    let query = if bool_body.is_empty() {
        json!({"match_all": {}})
    } else {
        json!({"bool": bool_body})
    };

    json!({
        "query": query,
        "_source": return_fields,
        "from": window.offset,
        "size": window.page_size,
        "track_total_hits": true,
    })
}

/// Translate a caller-facing field name to the backend's form. Keyword
/// fields are exact-match, so only case is normalized; dotted paths pass
/// through as the backend's nested-field syntax.
pub fn normalize_field(field: &str) -> String {
    field.to_lowercase()
}

fn terms_aggregation(bucket: &'static str, field: &str, query: Option<Value>) -> AggQuery {
    let mut aggs = Map::new();
    aggs.insert(bucket.to_string(), json!({"terms": {"field": field, "size": MAX_AGG_BUCKETS}}));
    let body = json!({
        "query": query.unwrap_or(json!({"match_all": {}})),
        "aggs": aggs,
        "size": 0,
    });
    AggQuery { bucket, body }
}

fn scoped_ids_query(field: &str, value: &str, window: PageWindow, filter: &SearchFilter) -> Value {
    let mut clauses = vec![term(field, &json!(value))];
    clauses.extend(filter_clauses(filter));

    // `total` in the response contract is the full match count, so the
    // backend's default 10k total-hits cap is lifted on every hit query.
    json!({
        "query": conjunction(clauses),
        "_source": ["id"],
        "from": window.offset,
        "size": window.page_size,
        "track_total_hits": true,
    })
}

fn filter_clauses(filter: &SearchFilter) -> Vec<Value> {
    let mut clauses = Vec::new();
    if let Some(start_time) = &filter.start_time {
        clauses.push(range("starttime", "gte", &json!(start_time)));
    }
    if let Some(end_time) = &filter.end_time {
        clauses.push(range("endtime", "lt", &json!(end_time)));
    }
    if let Some(polygon) = &filter.polygon {
        clauses.push(geo_shape(
            "location",
            json!({"type": "polygon", "coordinates": polygon.coordinates()}),
        ));
    }
    clauses
}

/// AND clauses together. A single clause stays bare, an empty list matches
/// everything.
fn conjunction(mut clauses: Vec<Value>) -> Value {
    match clauses.len() {
        0 => json!({"match_all": {}}),
        1 => clauses.remove(0),
        _ => json!({"bool": {"must": clauses}}),
    }
}

fn term(field: &str, value: &Value) -> Value {
    let mut inner = Map::new();
    inner.insert(field.to_string(), value.clone());
    json!({"term": inner})
}

fn range(field: &str, op: &str, value: &Value) -> Value {
    let mut bounds = Map::new();
    bounds.insert(op.to_string(), value.clone());
    let mut inner = Map::new();
    inner.insert(field.to_string(), Value::Object(bounds));
    json!({"range": inner})
}

fn geo_shape(field: &str, shape: Value) -> Value {
    let mut inner = Map::new();
    inner.insert(field.to_string(), json!({"shape": shape}));
    json!({"geo_shape": inner})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::parse_polygon;

    fn window() -> PageWindow {
        PageWindow { offset: 0, page_size: 10 }
    }

    #[test]
    fn types_query_is_match_all_with_capped_aggregation() {
        let query = types_query();
        assert_eq!(query.bucket, "types");
        assert_eq!(
            query.body,
            json!({
                "query": {"match_all": {}},
                "aggs": {"types": {"terms": {"field": "dataset_type.keyword", "size": 10000}}},
                "size": 0,
            })
        );
    }

    #[test]
    fn datasets_by_type_adds_the_complementary_term_filter() {
        let query = datasets_by_type_query("area_of_interest");
        assert_eq!(
            query.body,
            json!({
                "query": {"term": {"dataset_type.keyword": "area_of_interest"}},
                "aggs": {"datasets": {"terms": {"field": "dataset.keyword", "size": 10000}}},
                "size": 0,
            })
        );
    }

    #[test]
    fn ids_query_without_filters_stays_a_bare_term() {
        let body = ids_by_dataset_query("area_of_interest", window(), &SearchFilter::default());
        assert_eq!(
            body,
            json!({
                "query": {"term": {"dataset.keyword": "area_of_interest"}},
                "_source": ["id"],
                "from": 0,
                "size": 10,
                "track_total_hits": true,
            })
        );
    }

    #[test]
    fn ids_query_composes_all_optional_filters() {
        let filter = SearchFilter {
            start_time: Some("2020-01-01T00:00:00".to_string()),
            end_time: Some("2020-02-01T00:00:00".to_string()),
            polygon: Some(
                parse_polygon("[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,0.0]]]").unwrap(),
            ),
        };
        let body = ids_by_type_query("acquisition", window(), &filter);
        assert_eq!(
            body,
            json!({
                "query": {"bool": {"must": [
                    {"term": {"dataset_type.keyword": "acquisition"}},
                    {"range": {"starttime": {"gte": "2020-01-01T00:00:00"}}},
                    {"range": {"endtime": {"lt": "2020-02-01T00:00:00"}}},
                    {"geo_shape": {"location": {"shape": {
                        "type": "polygon",
                        "coordinates": [[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,0.0]]]
                    }}}},
                ]}},
                "_source": ["id"],
                "from": 0,
                "size": 10,
                "track_total_hits": true,
            })
        );
    }

    #[test]
    fn fields_query_preserves_term_insertion_order_and_normalizes_names() {
        let terms = vec![
            ("Dataset_Type.keyword".to_string(), json!("acquisition")),
            ("dataset.keyword".to_string(), json!("acquisition-S1-IW_SLC")),
        ];
        let fields = vec!["id".to_string(), "metadata.track_number".to_string()];
        let body = fields_query(&terms, &fields, window(), &SearchFilter::default());
        assert_eq!(
            body,
            json!({
                "query": {"bool": {"must": [
                    {"term": {"dataset_type.keyword": "acquisition"}},
                    {"term": {"dataset.keyword": "acquisition-S1-IW_SLC"}},
                ]}},
                "_source": ["id", "metadata.track_number"],
                "sort": [{"starttime": {"order": "desc"}}],
                "from": 0,
                "size": 10,
                "track_total_hits": true,
            })
        );
    }

    #[test]
    fn fields_query_with_no_terms_matches_everything() {
        let body = fields_query(&[], &["id".to_string()], window(), &SearchFilter::default());
        assert_eq!(body["query"], json!({"match_all": {}}));
    }

    #[test]
    fn overlaps_query_composes_temporal_and_spatial_predicates() {
        let envelope = OverlapEnvelope {
            starttime: Some("2017-04-18T21:09:23.789".to_string()),
            endtime: Some("2017-04-18T21:09:50.741".to_string()),
            location: Some(json!({
                "type": "Polygon",
                "coordinates": [[[123.2, -33.3], [120.6, -32.7], [123.2, -33.3]]]
            })),
        };
        let terms = vec![("dataset_type.keyword".to_string(), json!("acquisition"))];
        let body = overlaps_query(&envelope, &terms, &["id".to_string()], window());
        assert_eq!(
            body,
            json!({
                "query": {"bool": {
                    "must": [
                        {"term": {"dataset_type.keyword": "acquisition"}},
                        {"range": {"endtime": {"gt": "2017-04-18T21:09:23.789"}}},
                        {"range": {"starttime": {"lt": "2017-04-18T21:09:50.741"}}},
                    ],
                    "filter": [{"geo_shape": {"location": {"shape": {
                        "type": "Polygon",
                        "coordinates": [[[123.2, -33.3], [120.6, -32.7], [123.2, -33.3]]]
                    }}}}],
                }},
                "_source": ["id"],
                "from": 0,
                "size": 10,
                "track_total_hits": true,
            })
        );
    }

    #[test]
    fn overlaps_query_omits_absent_envelope_fields() {
        let envelope = OverlapEnvelope {
            starttime: Some("2020-01-01T00:00:00".to_string()),
            endtime: None,
            location: None,
        };
        let body = overlaps_query(&envelope, &[], &["id".to_string()], window());
        assert_eq!(
            body["query"],
            json!({"bool": {"must": [{"range": {"endtime": {"gt": "2020-01-01T00:00:00"}}}]}})
        );
    }

    #[test]
    fn overlaps_query_with_empty_envelope_matches_everything() {
        let body = overlaps_query(&OverlapEnvelope::default(), &[], &["id".to_string()], window());
        assert_eq!(body["query"], json!({"match_all": {}}));
    }

    #[test]
    fn field_normalization_lowercases_and_keeps_dots() {
        assert_eq!(normalize_field("Metadata.Track_Number"), "metadata.track_number");
        assert_eq!(normalize_field("dataset.keyword"), "dataset.keyword");
    }
}
