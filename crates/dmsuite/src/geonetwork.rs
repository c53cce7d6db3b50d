//! Importing GeoNetwork metadata records as STAC items.
//!
//! GeoNetwork search results describe datasets with a flat JSON record. Only
//! the keys needed for an item are read; everything else is ignored.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::item::{DESCRIPTION, TITLE};
use crate::stac::{rel, Geometry, Item, ItemParams, Link};
use crate::temporal::{parse_datetime, Temporal};

/// A metadata record as returned by a GeoNetwork search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeonetworkRecord {
    /// Metadata identifier, used as the item id.
    pub identifier: String,

    /// Dataset title.
    #[serde(default)]
    pub title: Option<String>,

    /// Dataset abstract.
    #[serde(default, rename = "abstract")]
    pub summary: Option<String>,

    /// Bounding boxes as `min_x|min_y|max_x|max_y`. GeoNetwork sends a single
    /// string when there is only one.
    #[serde(default, rename = "geoBox", deserialize_with = "one_or_many")]
    pub geo_box: Vec<String>,

    /// Start of the temporal extent.
    #[serde(default, rename = "tempExtentBegin")]
    pub temp_extent_begin: Option<String>,

    /// End of the temporal extent.
    #[serde(default, rename = "tempExtentEnd")]
    pub temp_extent_end: Option<String>,

    /// Revision dates, most relevant first.
    #[serde(default, rename = "revisionDate", deserialize_with = "one_or_many")]
    pub revision_date: Vec<String>,

    /// Catalog bookkeeping.
    #[serde(rename = "geonet:info")]
    pub info: GeonetworkInfo,
}

/// The `geonet:info` block of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GeonetworkInfo {
    /// Catalog UUID of the record.
    pub uuid: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl GeonetworkRecord {
    /// Parse a record from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if required keys are missing or mistyped.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The record's temporal extent.
    ///
    /// A range is used only when both ends are set and differ. Otherwise the
    /// item gets a single datetime: the extent's start, or failing that the
    /// first revision date.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] if a date cannot be parsed or the
    /// record carries no date at all.
    pub fn temporal(&self) -> Result<Temporal> {
        let parse = |value: Option<&str>| non_empty(value).map(parse_datetime).transpose();

        let begin = parse(self.temp_extent_begin.as_deref())?;
        let end = parse(self.temp_extent_end.as_deref())?;
        let datetime = match begin {
            Some(begin) => Some(begin),
            None => parse(self.revision_date.first().map(String::as_str))?,
        };

        Temporal::normalize(datetime, begin, end).ok_or_else(|| {
            Error::invalid_item(format!(
                "GeoNetwork record '{}' has no temporal extent or revision date",
                self.identifier
            ))
        })
    }

    /// Href of the item under `base_url`: `{base_url}/items/{uuid}`.
    #[must_use]
    pub fn item_href(&self, base_url: &str) -> String {
        format!("{}/items/{}", base_url.trim_end_matches('/'), self.info.uuid)
    }
}

impl Item {
    /// Convert a GeoNetwork record into a STAC item.
    ///
    /// The title and abstract become the `title` and `description`
    /// properties, the first geo box becomes the footprint, and the `self`
    /// link points at [`GeonetworkRecord::item_href`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] for an unparseable geo box or date, or
    /// when the record has no date to use.
    pub fn from_geonetwork(record: &GeonetworkRecord, base_url: &str) -> Result<Self> {
        let mut properties = Map::new();
        if let Some(title) = &record.title {
            properties.insert(TITLE.to_string(), Value::String(title.clone()));
        }
        if let Some(summary) = &record.summary {
            properties.insert(DESCRIPTION.to_string(), Value::String(summary.clone()));
        }

        let mut params = ItemParams {
            id: record.identifier.clone(),
            properties,
            ..ItemParams::default()
        }
        .with_temporal(record.temporal()?);
        if let Some(geo_box) = record.geo_box.first() {
            params = params.with_geometry(Geometry::from_geo_box(geo_box)?);
        }

        let mut item = Self::new(params)?;
        item.set_link(
            Link::new(rel::SELF, record.item_href(base_url)).with_media_type("application/json"),
        );

        debug!(id = %item.id, uuid = %record.info.uuid, "imported GeoNetwork record");
        Ok(item)
    }
}
