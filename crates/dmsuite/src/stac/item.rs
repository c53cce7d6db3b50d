//! The STAC Item record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{rel, Asset, Geometry, Link};
use crate::error::{Error, Result};
use crate::temporal::{format_datetime, parse_datetime, Temporal};

/// STAC version written by this crate.
pub const STAC_VERSION: &str = "1.0.0";

/// GeoJSON type of every item.
pub const ITEM_TYPE: &str = "Feature";

const DATETIME: &str = "datetime";
const START_DATETIME: &str = "start_datetime";
const END_DATETIME: &str = "end_datetime";

/// A STAC Item.
///
/// `properties` is the item's property bag. Temporal fields live there as
/// RFC 3339 strings, exactly as they appear in the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Always `Feature`.
    #[serde(rename = "type")]
    pub kind: String,

    /// STAC version the item conforms to.
    pub stac_version: String,

    /// Schema URIs of the extensions the item implements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stac_extensions: Vec<String>,

    /// Item identifier. Empty until assigned.
    pub id: String,

    /// Footprint of the item, `null` when unknown.
    pub geometry: Option<Geometry>,

    /// Bounding box, 4 values in 2D or 6 in 3D.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    /// The property bag.
    pub properties: Map<String, Value>,

    /// Links to related resources.
    #[serde(default)]
    pub links: Vec<Link>,

    /// Assets keyed by name.
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,

    /// Identifier of the parent collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    /// Top-level fields not covered above.
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

/// Arguments for [`Item::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemParams {
    /// Identifier; leave empty to have it assigned later.
    pub id: String,
    /// Footprint.
    pub geometry: Option<Geometry>,
    /// Bounding box.
    pub bbox: Option<Vec<f64>>,
    /// Single acquisition time.
    pub datetime: Option<DateTime<Utc>>,
    /// Start of the covered range.
    pub start_datetime: Option<DateTime<Utc>>,
    /// End of the covered range.
    pub end_datetime: Option<DateTime<Utc>>,
    /// Initial property bag.
    pub properties: Map<String, Value>,
    /// Parent collection identifier.
    pub collection: Option<String>,
    /// Extension schema URIs.
    pub stac_extensions: Vec<String>,
    /// Self href.
    pub href: Option<String>,
    /// Additional top-level fields.
    pub extra_fields: Map<String, Value>,
    /// Assets keyed by name.
    pub assets: BTreeMap<String, Asset>,
}

impl ItemParams {
    /// Set the temporal fields from a [`Temporal`], clearing the others.
    #[must_use]
    pub fn with_temporal(mut self, temporal: Temporal) -> Self {
        self.datetime = temporal.datetime();
        self.start_datetime = temporal.start();
        self.end_datetime = temporal.end();
        self
    }

    /// Set the geometry and, when it has positions, the matching bbox.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.bbox = geometry.bbox().map(|b| b.to_vec());
        self.geometry = Some(geometry);
        self
    }
}

/// Options for reading an item from its JSON form.
///
/// Whether the input is preserved is expressed through ownership:
/// [`Item::from_dict`] borrows and copies, [`Item::from_value`] consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FromDictOptions {
    /// Location the item was read from; becomes the `self` link.
    pub href: Option<String>,
    /// Location of the root catalog; becomes the `root` link.
    pub root: Option<String>,
    /// Bring older or incomplete item documents up to [`STAC_VERSION`].
    pub migrate: bool,
}

impl FromDictOptions {
    /// Set the self href.
    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the root catalog href.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Enable or disable migration.
    #[must_use]
    pub fn with_migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }
}

impl Item {
    /// Create an item.
    ///
    /// The temporal fields are written into the property bag; `datetime` is
    /// written as `null` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] if the geometry or bbox is malformed, or
    /// if `datetime` is absent without both `start_datetime` and
    /// `end_datetime`.
    pub fn new(params: ItemParams) -> Result<Self> {
        let mut properties = params.properties;
        properties.insert(
            DATETIME.to_string(),
            params
                .datetime
                .map_or(Value::Null, |dt| Value::String(format_datetime(&dt))),
        );
        for (key, value) in [
            (START_DATETIME, params.start_datetime),
            (END_DATETIME, params.end_datetime),
        ] {
            if let Some(dt) = value {
                properties.insert(key.to_string(), Value::String(format_datetime(&dt)));
            }
        }

        let mut item = Self {
            kind: ITEM_TYPE.to_string(),
            stac_version: STAC_VERSION.to_string(),
            stac_extensions: params.stac_extensions,
            id: params.id,
            geometry: params.geometry,
            bbox: params.bbox,
            properties,
            links: Vec::new(),
            assets: params.assets,
            collection: params.collection,
            extra_fields: params.extra_fields,
        };
        item.validate()?;

        if let Some(href) = params.href {
            item.set_self_href(href);
        }

        debug!(id = %item.id, "created item");
        Ok(item)
    }

    /// Read an item from its JSON form, leaving the input untouched.
    ///
    /// # Errors
    ///
    /// See [`Item::from_value`].
    pub fn from_dict(dict: &Value, options: FromDictOptions) -> Result<Self> {
        Self::from_value(dict.clone(), options)
    }

    /// Read an item from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if required STAC fields are missing or have the
    /// wrong type, and [`Error::InvalidItem`] if the input is not an object or
    /// fails the same checks as [`Item::new`].
    pub fn from_value(mut value: Value, options: FromDictOptions) -> Result<Self> {
        let Value::Object(map) = &mut value else {
            return Err(Error::invalid_item("item must be a JSON object"));
        };
        if options.migrate {
            migrate(map);
        }

        let mut item: Self = serde_json::from_value(value)?;
        item.validate()?;

        if let Some(href) = options.href {
            item.set_self_href(href);
        }
        if let Some(root) = options.root {
            item.set_root_href(root);
        }

        debug!(id = %item.id, links = item.links.len(), "read item");
        Ok(item)
    }

    /// Serialize to the JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Check the structural rules shared by construction and parsing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.kind != ITEM_TYPE {
            return Err(Error::invalid_item(format!(
                "type must be '{ITEM_TYPE}', got '{}'",
                self.kind
            )));
        }

        if let Some(geometry) = &self.geometry {
            geometry.validate()?;
        }

        if let Some(bbox) = &self.bbox {
            if bbox.len() != 4 && bbox.len() != 6 {
                return Err(Error::invalid_item(format!(
                    "bbox must have 4 or 6 values, got {}",
                    bbox.len()
                )));
            }
            if bbox.iter().any(|v| !v.is_finite()) {
                return Err(Error::invalid_item("bbox values must be finite"));
            }
            // x may wrap across the antimeridian, so only y (and z) are ordered.
            let half = bbox.len() / 2;
            for (axis, name) in [(1, "y"), (2, "z")].into_iter().take(half - 1) {
                if bbox[axis] > bbox[axis + half] {
                    return Err(Error::invalid_item(format!(
                        "bbox minimum {name} ({}) is greater than maximum {name} ({})",
                        bbox[axis],
                        bbox[axis + half]
                    )));
                }
            }
        }

        if self.property_datetime(DATETIME)?.is_none()
            && (self.property_datetime(START_DATETIME)?.is_none()
                || self.property_datetime(END_DATETIME)?.is_none())
        {
            return Err(Error::invalid_item(
                "datetime is null, so start_datetime and end_datetime must be supplied",
            ));
        }

        Ok(())
    }

    /// The `datetime` property.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        self.property_datetime(DATETIME).ok().flatten()
    }

    /// The `start_datetime` property.
    #[must_use]
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        self.property_datetime(START_DATETIME).ok().flatten()
    }

    /// The `end_datetime` property.
    #[must_use]
    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        self.property_datetime(END_DATETIME).ok().flatten()
    }

    /// The temporal extent, range taking precedence over `datetime`.
    #[must_use]
    pub fn temporal(&self) -> Option<Temporal> {
        match (self.start_datetime(), self.end_datetime()) {
            (Some(start), Some(end)) => Some(Temporal::Range { start, end }),
            _ => self.datetime().map(Temporal::Instant),
        }
    }

    fn property_datetime(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        match self.properties.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => parse_datetime(s).map(Some),
            Some(other) => Err(Error::invalid_item(format!(
                "{key} must be a string or null, got {other}"
            ))),
        }
    }

    /// The first link with relation `rel`.
    ///
    /// Items are expected to carry at most one link per singular relation;
    /// extra matches are logged and ignored.
    #[must_use]
    pub fn get_single_link(&self, rel: &str) -> Option<&Link> {
        let mut matches = self.links.iter().filter(|link| link.is_rel(rel));
        let first = matches.next();

        let extra = matches.count();
        if extra > 0 {
            warn!(
                id = %self.id,
                rel,
                count = extra + 1,
                "item has several links with the same relation, using the first"
            );
        }
        first
    }

    /// Replace all links with the same relation as `link`.
    pub fn set_link(&mut self, link: Link) {
        self.links.retain(|existing| !existing.is_rel(&link.rel));
        self.links.push(link);
    }

    /// Add a link, keeping any existing ones.
    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// The `self` link target.
    #[must_use]
    pub fn self_href(&self) -> Option<&str> {
        self.get_single_link(rel::SELF).map(|link| link.href.as_str())
    }

    /// Set the `self` link target.
    pub fn set_self_href(&mut self, href: impl Into<String>) {
        self.set_link(Link::new(rel::SELF, href).with_media_type("application/geo+json"));
    }

    /// Set the `root` link target.
    pub fn set_root_href(&mut self, href: impl Into<String>) {
        self.set_link(Link::new(rel::ROOT, href).with_media_type("application/json"));
    }
}

/// Upgrade an item document in place.
fn migrate(map: &mut Map<String, Value>) {
    map.entry("type")
        .or_insert_with(|| Value::String(ITEM_TYPE.to_string()));

    let outdated = map
        .get("stac_version")
        .and_then(Value::as_str)
        .map_or(true, predates_v1);
    if outdated {
        debug!(from = ?map.get("stac_version"), to = STAC_VERSION, "migrating item");
        map.insert(
            "stac_version".to_string(),
            Value::String(STAC_VERSION.to_string()),
        );
    }

    if let Some(Value::Array(extensions)) = map.get_mut("stac_extensions") {
        let mut seen = Vec::with_capacity(extensions.len());
        extensions.retain(|ext| {
            if seen.contains(ext) {
                false
            } else {
                seen.push(ext.clone());
                true
            }
        });
    }
}

/// Whether a STAC version predates 1.0.
fn predates_v1(version: &str) -> bool {
    version
        .trim_start_matches('v')
        .split('.')
        .next()
        .and_then(|major| major.parse::<u32>().ok())
        .map_or(true, |major| major < 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": "item-1",
            "geometry": {"type": "Point", "coordinates": [4.5, 52.0]},
            "bbox": [4.5, 52.0, 4.5, 52.0],
            "properties": {"datetime": "2024-01-01T00:00:00Z", "platform": "buoy"},
            "links": [],
            "assets": {}
        })
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_new_writes_datetime() {
        let item = Item::new(ItemParams {
            datetime: Some(jan(1)),
            ..ItemParams::default()
        })
        .unwrap();

        assert_eq!(item.kind, "Feature");
        assert_eq!(item.stac_version, STAC_VERSION);
        assert!(item.id.is_empty());
        assert_eq!(item.properties["datetime"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(item.datetime(), Some(jan(1)));
    }

    #[test]
    fn test_new_with_range() {
        let params = ItemParams::default().with_temporal(Temporal::Range {
            start: jan(1),
            end: jan(2),
        });
        let item = Item::new(params).unwrap();

        assert_eq!(item.properties["datetime"], Value::Null);
        assert_eq!(item.start_datetime(), Some(jan(1)));
        assert_eq!(item.end_datetime(), Some(jan(2)));
        assert_eq!(
            item.temporal(),
            Some(Temporal::Range {
                start: jan(1),
                end: jan(2)
            })
        );
    }

    #[test]
    fn test_new_without_any_datetime_fails() {
        let err = Item::new(ItemParams::default()).unwrap_err();
        assert!(err.to_string().contains("start_datetime"));
    }

    #[test]
    fn test_new_with_half_range_fails() {
        let result = Item::new(ItemParams {
            start_datetime: Some(jan(1)),
            ..ItemParams::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_bad_bbox() {
        let result = Item::new(ItemParams {
            datetime: Some(jan(1)),
            bbox: Some(vec![1.0, 2.0, 3.0]),
            ..ItemParams::default()
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("bbox must have 4 or 6 values"));
    }

    #[test]
    fn test_new_rejects_inverted_bbox() {
        let result = Item::new(ItemParams {
            datetime: Some(jan(1)),
            bbox: Some(vec![5.0, 5.0, 1.0, 1.0]),
            ..ItemParams::default()
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("minimum y"));
    }

    #[test]
    fn test_new_rejects_inverted_3d_bbox() {
        let result = Item::new(ItemParams {
            datetime: Some(jan(1)),
            bbox: Some(vec![0.0, 0.0, 10.0, 1.0, 1.0, -5.0]),
            ..ItemParams::default()
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("minimum z"));
    }

    #[test]
    fn test_bbox_crossing_antimeridian_is_accepted() {
        let item = Item::new(ItemParams {
            datetime: Some(jan(1)),
            bbox: Some(vec![170.0, -10.0, -170.0, 10.0]),
            ..ItemParams::default()
        })
        .unwrap();
        assert_eq!(item.bbox, Some(vec![170.0, -10.0, -170.0, 10.0]));
    }

    #[test]
    fn test_from_value_rejects_inverted_bbox() {
        let mut value = sample();
        value["bbox"] = json!([0.0, 3.0, 1.0, 2.0]);
        let err = Item::from_value(value, FromDictOptions::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidItem { .. }));
    }

    #[test]
    fn test_new_rejects_bad_geometry() {
        let result = Item::new(ItemParams {
            datetime: Some(jan(1)),
            geometry: Some(Geometry {
                kind: "Square".to_string(),
                coordinates: json!([]),
                geometries: Vec::new(),
            }),
            ..ItemParams::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_new_sets_self_link() {
        let item = Item::new(ItemParams {
            datetime: Some(jan(1)),
            href: Some("https://example.com/items/a.json".to_string()),
            ..ItemParams::default()
        })
        .unwrap();
        assert_eq!(item.self_href(), Some("https://example.com/items/a.json"));
    }

    #[test]
    fn test_with_geometry_sets_bbox() {
        let params =
            ItemParams::default().with_geometry(Geometry::polygon_from_bounds(1.0, 2.0, 3.0, 4.0));
        assert_eq!(params.bbox, Some(vec![1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_from_dict_preserves_input() {
        let dict = sample();
        let item = Item::from_dict(&dict, FromDictOptions::default()).unwrap();

        assert_eq!(item.id, "item-1");
        assert_eq!(item.properties["platform"], json!("buoy"));
        assert_eq!(dict["id"], json!("item-1"));
    }

    #[test]
    fn test_from_value_round_trip() {
        let item = Item::from_value(sample(), FromDictOptions::default()).unwrap();
        assert_eq!(item.to_value().unwrap(), sample());
    }

    #[test]
    fn test_from_value_keeps_extra_fields() {
        let mut value = sample();
        value["custom:owner"] = json!("hydraulics");
        let item = Item::from_value(value, FromDictOptions::default()).unwrap();

        assert_eq!(item.extra_fields["custom:owner"], json!("hydraulics"));
        assert_eq!(item.to_value().unwrap()["custom:owner"], json!("hydraulics"));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = Item::from_value(json!([1, 2]), FromDictOptions::default()).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn test_from_value_missing_properties_is_json_error() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("properties");
        let err = Item::from_value(value, FromDictOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_value_rejects_invalid_datetime() {
        let mut value = sample();
        value["properties"]["datetime"] = json!("not a date");
        assert!(Item::from_value(value, FromDictOptions::default()).is_err());
    }

    #[test]
    fn test_from_value_accepts_range_without_datetime() {
        let mut value = sample();
        value["properties"] = json!({
            "datetime": null,
            "start_datetime": "2024-01-01T00:00:00Z",
            "end_datetime": "2024-01-31T00:00:00Z"
        });
        let item = Item::from_value(value, FromDictOptions::default()).unwrap();
        assert!(item.datetime().is_none());
        assert_eq!(item.start_datetime(), Some(jan(1)));
    }

    #[test]
    fn test_from_value_sets_href_and_root() {
        let options = FromDictOptions::default()
            .with_href("https://example.com/items/item-1.json")
            .with_root("https://example.com/catalog.json");
        let item = Item::from_value(sample(), options).unwrap();

        assert_eq!(item.self_href(), Some("https://example.com/items/item-1.json"));
        assert_eq!(
            item.get_single_link(rel::ROOT).map(|l| l.href.as_str()),
            Some("https://example.com/catalog.json")
        );
    }

    #[test]
    fn test_migrate_fills_type_and_version() {
        let mut value = sample();
        let map = value.as_object_mut().unwrap();
        map.remove("type");
        map.insert("stac_version".to_string(), json!("0.9.0"));
        map.insert(
            "stac_extensions".to_string(),
            json!(["https://stac-extensions.github.io/eo/v1.0.0/schema.json",
                   "https://stac-extensions.github.io/eo/v1.0.0/schema.json"]),
        );

        let item = Item::from_value(value, FromDictOptions::default().with_migrate(true)).unwrap();
        assert_eq!(item.kind, ITEM_TYPE);
        assert_eq!(item.stac_version, STAC_VERSION);
        assert_eq!(item.stac_extensions.len(), 1);
    }

    #[test]
    fn test_without_migrate_missing_type_fails() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("type");
        assert!(Item::from_value(value, FromDictOptions::default()).is_err());
    }

    #[test]
    fn test_migrate_keeps_current_version() {
        let mut value = sample();
        value["stac_version"] = json!("1.1.0");
        let item = Item::from_value(value, FromDictOptions::default().with_migrate(true)).unwrap();
        assert_eq!(item.stac_version, "1.1.0");
    }

    #[test]
    fn test_predates_v1() {
        assert!(predates_v1("0.8.1"));
        assert!(predates_v1("v0.9.0"));
        assert!(predates_v1("garbage"));
        assert!(!predates_v1("1.0.0"));
        assert!(!predates_v1("1.0.0-rc.2"));
    }

    #[test]
    fn test_get_single_link_returns_first() {
        crate::logging::init_test_logging();

        let mut item = Item::from_value(sample(), FromDictOptions::default()).unwrap();
        item.add_link(Link::collection("https://example.com/collections/a"));
        item.add_link(Link::collection("https://example.com/collections/b"));

        let link = item.get_single_link(rel::COLLECTION).unwrap();
        assert_eq!(link.href, "https://example.com/collections/a");
        assert!(item.get_single_link(rel::PARENT).is_none());
    }

    #[test]
    fn test_set_link_replaces_same_rel() {
        let mut item = Item::from_value(sample(), FromDictOptions::default()).unwrap();
        item.set_self_href("a.json");
        item.set_self_href("b.json");

        assert_eq!(item.links.len(), 1);
        assert_eq!(item.self_href(), Some("b.json"));
    }
}
