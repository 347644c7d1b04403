//! In-memory search backend for development and testing.
//!
//! Interprets the query DSL subset the catalog builders emit (`match_all`,
//! `term`, `bool` must/filter, `range`, `geo_shape` intersection, terms
//! aggregations, result windowing, `_source` projection, single-field sort)
//! over a plain document list. `RwLock::unwrap()` is intentional here: lock
//! poisoning only occurs when another thread panicked while holding the
//! lock, which is an unrecoverable state. Production workloads use
//! [`crate::es::EsBackend`].

use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use geo::Intersects;
use geocat_core::error::{CatalogError, Result};
use serde_json::{json, Map, Value};

use crate::ports::SearchBackend;

/// In-memory implementation of [`SearchBackend`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    docs: Arc<RwLock<Vec<Value>>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document. The `id` field doubles as the backend `_id`.
    pub fn index(&self, doc: Value) {
        self.docs.write().unwrap().push(doc);
    }

    /// Add a batch of documents.
    pub fn index_all(&self, docs: impl IntoIterator<Item = Value>) {
        self.docs.write().unwrap().extend(docs);
    }
}

#[async_trait]
impl SearchBackend for MemoryBackend {
    async fn search(&self, _index: &str, body: &Value) -> Result<Value> {
        let docs = self.docs.read().unwrap().clone();

        let query = body.get("query").cloned().unwrap_or(json!({"match_all": {}}));
        let mut matched = Vec::new();
        for doc in &docs {
            if eval_query(doc, &query)? {
                matched.push(doc.clone());
            }
        }

        let aggregations = match body.get("aggs").or_else(|| body.get("aggregations")) {
            Some(aggs) => Some(run_aggregations(&matched, aggs)?),
            None => None,
        };

        apply_sort(&mut matched, body.get("sort"))?;

        let total = matched.len();
        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

        let hits: Vec<Value> = matched
            .into_iter()
            .skip(from)
            .take(size)
            .map(|doc| {
                let id = doc.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
                let source = match body.get("_source").and_then(Value::as_array) {
                    Some(fields) => project(&doc, fields),
                    None => doc,
                };
                json!({"_id": id, "_source": source})
            })
            .collect();

        let mut response = json!({
            "hits": {
                "total": {"value": total, "relation": "eq"},
                "hits": hits,
            }
        });
        if let Some(aggs) = aggregations {
            response["aggregations"] = aggs;
        }
        Ok(response)
    }
}

fn eval_query(doc: &Value, query: &Value) -> Result<bool> {
    let clause = query
        .as_object()
        .and_then(|o| o.iter().next())
        .ok_or_else(|| CatalogError::backend("memory backend: empty query clause"))?;

    match (clause.0.as_str(), clause.1) {
        ("match_all", _) => Ok(true),
        ("term", spec) => eval_term(doc, spec),
        ("range", spec) => eval_range(doc, spec),
        ("geo_shape", spec) => eval_geo_shape(doc, spec),
        ("bool", spec) => eval_bool(doc, spec),
        (other, _) => Err(CatalogError::backend(format!(
            "memory backend does not support query clause: {other}"
        ))),
    }
}

fn eval_bool(doc: &Value, spec: &Value) -> Result<bool> {
    for key in ["must", "filter"] {
        for clause in clause_list(spec.get(key)) {
            if !eval_query(doc, clause)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn clause_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(clauses)) => clauses.iter().collect(),
        Some(single) => vec![single],
        None => Vec::new(),
    }
}

fn eval_term(doc: &Value, spec: &Value) -> Result<bool> {
    let (field, expected) = single_entry(spec, "term")?;
    match lookup(doc, field) {
        // Multi-valued fields match when any element matches.
        Some(Value::Array(values)) => Ok(values.iter().any(|v| v == expected)),
        Some(actual) => Ok(actual == expected),
        None => Ok(false),
    }
}

fn eval_range(doc: &Value, spec: &Value) -> Result<bool> {
    let (field, bounds) = single_entry(spec, "range")?;
    let Some(actual) = lookup(doc, field) else {
        return Ok(false);
    };
    let bounds = bounds
        .as_object()
        .ok_or_else(|| CatalogError::backend("memory backend: range bounds must be an object"))?;

    for (op, bound) in bounds {
        let ordering = compare_values(actual, bound);
        let holds = match op.as_str() {
            "gt" => ordering == Ordering::Greater,
            "gte" => ordering != Ordering::Less,
            "lt" => ordering == Ordering::Less,
            "lte" => ordering != Ordering::Greater,
            other => {
                return Err(CatalogError::backend(format!(
                    "memory backend does not support range operator: {other}"
                )))
            }
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval_geo_shape(doc: &Value, spec: &Value) -> Result<bool> {
    let (field, shape_spec) = single_entry(spec, "geo_shape")?;
    if let Some(relation) = shape_spec.get("relation").and_then(Value::as_str) {
        if relation != "intersects" {
            return Err(CatalogError::backend(format!(
                "memory backend does not support geo_shape relation: {relation}"
            )));
        }
    }
    let shape = shape_spec
        .get("shape")
        .ok_or_else(|| CatalogError::backend("memory backend: geo_shape without a shape"))?;
    let query_geometry = parse_geometry(shape).ok_or_else(|| {
        CatalogError::backend(format!("memory backend: unparseable geo_shape: {shape}"))
    })?;

    // Documents without a usable geometry simply don't match.
    let Some(doc_geometry) = lookup(doc, field).and_then(parse_geometry) else {
        return Ok(false);
    };
    Ok(doc_geometry.intersects(&query_geometry))
}

/// Decode a GeoJSON-like value into a `geo` geometry. Accepts both proper
/// GeoJSON type casing and the lowercase type names the query DSL uses.
fn parse_geometry(value: &Value) -> Option<geo::Geometry<f64>> {
    let mut value = value.clone();
    let canonical = match value.get("type")?.as_str()?.to_ascii_lowercase().as_str() {
        "point" => "Point",
        "multipoint" => "MultiPoint",
        "linestring" => "LineString",
        "multilinestring" => "MultiLineString",
        "polygon" => "Polygon",
        "multipolygon" => "MultiPolygon",
        _ => return None,
    };
    value["type"] = json!(canonical);
    let geometry: geojson::Geometry = serde_json::from_value(value).ok()?;
    geo::Geometry::<f64>::try_from(geometry).ok()
}

/// Resolve a query field name against a document: `_id` aliases `id`,
/// `.keyword` sub-fields collapse onto their parent, dotted paths descend
/// into nested objects.
fn lookup<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    let field = field.strip_suffix(".keyword").unwrap_or(field);
    let field = if field == "_id" { "id" } else { field };

    let mut current = doc;
    for part in field.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn single_entry<'a>(spec: &'a Value, clause: &str) -> Result<(&'a str, &'a Value)> {
    spec.as_object()
        .and_then(|o| o.iter().next())
        .map(|(k, v)| (k.as_str(), v))
        .ok_or_else(|| {
            CatalogError::backend(format!("memory backend: {clause} clause must name a field"))
        })
}

/// Numbers compare numerically, everything else as strings (which is the
/// correct ordering for ISO-8601 timestamps).
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => value_str(a).cmp(&value_str(b)),
    }
}

fn value_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_sort(docs: &mut [Value], sort: Option<&Value>) -> Result<()> {
    let Some(clauses) = sort.and_then(Value::as_array) else {
        return Ok(());
    };

    let mut specs = Vec::new();
    for clause in clauses {
        match clause {
            Value::String(field) => specs.push((field.clone(), false)),
            Value::Object(spec) => {
                let (field, options) = spec.iter().next().ok_or_else(|| {
                    CatalogError::backend("memory backend: empty sort clause")
                })?;
                let descending =
                    options.get("order").and_then(Value::as_str) == Some("desc");
                specs.push((field.clone(), descending));
            }
            other => {
                return Err(CatalogError::backend(format!(
                    "memory backend does not support sort clause: {other}"
                )))
            }
        }
    }

    docs.sort_by(|a, b| {
        for (field, descending) in &specs {
            let ordering = match (lookup(a, field), lookup(b, field)) {
                (Some(left), Some(right)) => {
                    let ordering = compare_values(left, right);
                    if *descending { ordering.reverse() } else { ordering }
                }
                // Missing values sort after present ones.
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

fn run_aggregations(matched: &[Value], aggs: &Value) -> Result<Value> {
    let aggs = aggs
        .as_object()
        .ok_or_else(|| CatalogError::backend("memory backend: aggs must be an object"))?;

    let mut out = Map::new();
    for (name, spec) in aggs {
        let terms = spec.get("terms").ok_or_else(|| {
            CatalogError::backend(format!("memory backend only supports terms aggregations: {name}"))
        })?;
        let field = terms
            .get("field")
            .and_then(Value::as_str)
            .ok_or_else(|| CatalogError::backend("memory backend: terms aggregation without field"))?;
        let size = terms.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

        let mut counts: Vec<(String, u64)> = Vec::new();
        for doc in matched {
            let Some(value) = lookup(doc, field) else {
                continue;
            };
            let key = value_str(value);
            match counts.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) => *count += 1,
                None => counts.push((key, 1)),
            }
        }
        // Backend bucket order: doc count descending, key ascending on ties.
        counts.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
        counts.truncate(size);

        let buckets: Vec<Value> = counts
            .into_iter()
            .map(|(key, doc_count)| json!({"key": key, "doc_count": doc_count}))
            .collect();
        out.insert(name.clone(), json!({"buckets": buckets}));
    }
    Ok(Value::Object(out))
}

/// Source filtering: rebuild a document from the requested field paths,
/// preserving nesting for dotted paths.
fn project(doc: &Value, fields: &[Value]) -> Value {
    let mut out = Map::new();
    for field in fields {
        let Some(path) = field.as_str() else {
            continue;
        };
        let Some(value) = lookup(doc, path) else {
            continue;
        };
        insert_path(&mut out, path, value.clone());
    }
    Value::Object(out)
}

fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(nested) = entry {
                insert_path(nested, rest, value);
            }
        }
    }
}
