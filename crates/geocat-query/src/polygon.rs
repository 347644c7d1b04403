//! Textual polygon decoding for geo-shape filters.

use geocat_core::error::{CatalogError, Result};
use serde_json::Value;

/// A decoded polygon: one or more rings of `[longitude, latitude]` pairs.
///
/// Only structural well-formedness is guaranteed here (the decoded value is
/// a JSON array); ring closure and self-intersection checks are left to the
/// search backend, which validates shapes on query execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon(Value);

impl Polygon {
    /// Wrap an already-decoded coordinate value, e.g. from a JSON request
    /// body. Fails unless the top-level value is an array.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_array() {
            return Err(CatalogError::InvalidPolygon { value: value.to_string() });
        }
        Ok(Self(value))
    }

    pub fn coordinates(&self) -> &Value {
        &self.0
    }

    pub fn into_coordinates(self) -> Value {
        self.0
    }
}

/// Parse a JSON-encoded polygon string, e.g.
/// `"[[[148.165, -34.865], [148.195, -34.865], [148.165, -34.865]]]"`.
pub fn parse_polygon(input: &str) -> Result<Polygon> {
    let value: Value = serde_json::from_str(input)
        .map_err(|_| CatalogError::InvalidPolygon { value: input.to_string() })?;
    Polygon::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn parses_a_ring_list() {
        let ring = json!([[[148.165, -34.865], [120.578, -32.708], [148.165, -34.865]]]);
        let polygon = parse_polygon(&ring.to_string()).unwrap();
        assert_eq!(polygon.coordinates(), &ring);
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_polygon("not json").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPolygon { .. }));
        assert!(err.to_string().contains("not json"));
    }

    #[test]
    fn rejects_valid_json_that_is_not_a_list() {
        let err = parse_polygon("42").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPolygon { .. }));
    }

    #[test]
    fn rejects_non_list_value_from_request_body() {
        let err = Polygon::from_value(json!({"type": "Polygon"})).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPolygon { .. }));
    }

    proptest! {
        #[test]
        fn round_trips_any_well_formed_ring(ring in proptest::collection::vec(
            proptest::collection::vec((-180.0f64..180.0, -90.0f64..90.0), 3..8),
            1..3,
        )) {
            let encoded = serde_json::to_string(&ring).unwrap();
            let decoded = parse_polygon(&encoded).unwrap();
            let expected: Value = serde_json::to_value(&ring).unwrap();
            prop_assert_eq!(decoded.coordinates(), &expected);
        }
    }
}
