//! GeoJSON geometry objects.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};

/// Geometry types allowed by GeoJSON (RFC 7946).
pub const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// A GeoJSON geometry.
///
/// Coordinates are kept as raw JSON so every geometry type round-trips
/// unchanged. Use [`Geometry::validate`] to check the basic shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Geometry type, one of [`GEOMETRY_TYPES`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Nested coordinate arrays.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub coordinates: Value,

    /// Members of a `GeometryCollection`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geometries: Vec<Geometry>,
}

impl Geometry {
    /// Build a rectangular polygon from its bounds.
    ///
    /// The ring is closed and wound counter-clockwise.
    #[must_use]
    pub fn polygon_from_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            kind: "Polygon".to_string(),
            coordinates: json!([[
                [min_x, min_y],
                [max_x, min_y],
                [max_x, max_y],
                [min_x, max_y],
                [min_x, min_y]
            ]]),
            geometries: Vec::new(),
        }
    }

    /// Parse a pipe-delimited bounding box such as `"4.2|51.8|4.6|52.1"`.
    ///
    /// The values are `min_x|min_y|max_x|max_y`, the layout GeoNetwork uses
    /// for its `geoBox` field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] unless the string holds exactly four
    /// finite numbers.
    pub fn from_geo_box(geo_box: &str) -> Result<Self> {
        let values = geo_box
            .split('|')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::invalid_item(format!("invalid geo box '{geo_box}': {e}")))?;

        match values.as_slice() {
            &[min_x, min_y, max_x, max_y] if values.iter().all(|v| v.is_finite()) => {
                Ok(Self::polygon_from_bounds(min_x, min_y, max_x, max_y))
            }
            _ => Err(Error::invalid_item(format!(
                "geo box '{geo_box}' must contain four numbers separated by '|'"
            ))),
        }
    }

    /// Check the geometry type and that coordinates are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !GEOMETRY_TYPES.contains(&self.kind.as_str()) {
            return Err(Error::invalid_item(format!(
                "unknown geometry type '{}'",
                self.kind
            )));
        }

        if self.kind == "GeometryCollection" {
            return self.geometries.iter().try_for_each(Self::validate);
        }

        if !self.coordinates.is_array() {
            return Err(Error::invalid_item(format!(
                "{} geometry must have a coordinates array",
                self.kind
            )));
        }

        Ok(())
    }

    /// The 2D bounds `[min_x, min_y, max_x, max_y]` of all positions.
    ///
    /// Returns `None` for geometries without any positions.
    #[must_use]
    pub fn bbox(&self) -> Option<[f64; 4]> {
        let mut bounds: Option<[f64; 4]> = None;
        self.visit_positions(&mut |x, y| {
            let b = bounds.get_or_insert([x, y, x, y]);
            b[0] = b[0].min(x);
            b[1] = b[1].min(y);
            b[2] = b[2].max(x);
            b[3] = b[3].max(y);
        });
        bounds
    }

    fn visit_positions(&self, f: &mut impl FnMut(f64, f64)) {
        visit_coordinates(&self.coordinates, f);
        for geometry in &self.geometries {
            geometry.visit_positions(f);
        }
    }
}

fn visit_coordinates(value: &Value, f: &mut impl FnMut(f64, f64)) {
    let Value::Array(items) = value else {
        return;
    };

    // A position is an array whose first element is a number
    if let (Some(x), Some(y)) = (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        f(x, y);
        return;
    }

    for item in items {
        visit_coordinates(item, f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_from_bounds_is_closed() {
        let polygon = Geometry::polygon_from_bounds(4.0, 51.0, 5.0, 52.0);
        assert_eq!(polygon.kind, "Polygon");

        let ring = polygon.coordinates[0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_from_geo_box() {
        let polygon = Geometry::from_geo_box("4.2|51.8|4.6|52.1").unwrap();
        assert_eq!(polygon.bbox(), Some([4.2, 51.8, 4.6, 52.1]));
    }

    #[test]
    fn test_from_geo_box_tolerates_spaces() {
        let polygon = Geometry::from_geo_box(" 1 | 2 | 3 | 4 ").unwrap();
        assert_eq!(polygon.bbox(), Some([1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_from_geo_box_wrong_count() {
        let err = Geometry::from_geo_box("1|2|3").unwrap_err();
        assert!(err.to_string().contains("four numbers"));
    }

    #[test]
    fn test_from_geo_box_not_numeric() {
        let err = Geometry::from_geo_box("a|2|3|4").unwrap_err();
        assert!(err.to_string().contains("invalid geo box"));
    }

    #[test]
    fn test_validate_unknown_type() {
        let geometry = Geometry {
            kind: "Circle".to_string(),
            coordinates: json!([0, 0]),
            geometries: Vec::new(),
        };
        let err = geometry.validate().unwrap_err();
        assert!(err.to_string().contains("Circle"));
    }

    #[test]
    fn test_validate_missing_coordinates() {
        let geometry: Geometry = serde_json::from_value(json!({"type": "Point"})).unwrap();
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_validate_geometry_collection() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [1.0, 2.0]},
                {"type": "LineString", "coordinates": [[0.0, 0.0], [3.0, -1.0]]}
            ]
        }))
        .unwrap();
        assert!(geometry.validate().is_ok());
        assert_eq!(geometry.bbox(), Some([0.0, -1.0, 3.0, 2.0]));
    }

    #[test]
    fn test_point_bbox() {
        let geometry: Geometry =
            serde_json::from_value(json!({"type": "Point", "coordinates": [5.5, 52.0, 10.0]}))
                .unwrap();
        assert_eq!(geometry.bbox(), Some([5.5, 52.0, 5.5, 52.0]));
    }

    #[test]
    fn test_empty_geometry_has_no_bbox() {
        let geometry: Geometry =
            serde_json::from_value(json!({"type": "MultiPoint", "coordinates": []})).unwrap();
        assert!(geometry.bbox().is_none());
    }

    #[test]
    fn test_geometry_round_trips_through_json() {
        let value = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        let geometry: Geometry = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&geometry).unwrap(), value);
    }
}
