use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog granule as indexed by the external ingestion pipeline.
///
/// Documents are created and updated outside this system; the catalog only
/// ever reads them. Every field beyond `id` is optional because older
/// granules predate parts of the schema, and field queries may project
/// arbitrary subsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDocument {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_type: Option<String>,
    /// ISO-8601 timestamp; `starttime <= endtime` is expected of the
    /// ingestion pipeline but not enforced here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endtime: Option<String>,
    /// GeoJSON-like footprint geometry, kept untyped so it can be passed
    /// verbatim back into geo-shape filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub browse_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
    /// Fields outside the modeled schema survive a decode/encode round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Browse image descriptor attached to a granule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_full_granule() {
        let doc: DatasetDocument = serde_json::from_value(json!({
            "id": "S1-IW_SLC__1SDV_20200101",
            "dataset": "acquisition-S1-IW_SLC",
            "dataset_type": "acquisition",
            "starttime": "2020-01-01T00:00:00",
            "endtime": "2020-01-01T00:00:25",
            "location": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]},
            "metadata": {"track_number": 35},
            "urls": ["http://example.com/granule"],
            "images": [{"img": "browse.png", "tooltip": "browse"}],
            "system_version": "v2.0"
        }))
        .unwrap();

        assert_eq!(doc.dataset_type.as_deref(), Some("acquisition"));
        assert_eq!(doc.images.len(), 1);
        // Unmodeled fields land in the flattened map.
        assert_eq!(doc.extra.get("system_version"), Some(&json!("v2.0")));
    }

    #[test]
    fn minimal_granule_needs_only_an_id() {
        let doc: DatasetDocument = serde_json::from_value(json!({"id": "bare"})).unwrap();
        assert!(doc.starttime.is_none());
        assert!(doc.location.is_none());
        assert!(doc.urls.is_empty());
    }
}
