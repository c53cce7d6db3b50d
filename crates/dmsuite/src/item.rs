//! Data Management Suite catalog items.
//!
//! A [`DmsItem`] is a STAC [`Item`] whose property bag always carries five
//! descriptive fields: `title`, `projectNumber`, `description`, `location`
//! and `license`. The item also knows which collection it belongs to, either
//! from an explicit `collectionId` in its JSON form or from its `collection`
//! link.
//!
//! # Example
//!
//! ```
//! use dmsuite::{DmsItem, FromDictOptions};
//! use serde_json::json;
//!
//! let item = DmsItem::from_value(
//!     json!({
//!         "type": "Feature",
//!         "stac_version": "1.0.0",
//!         "id": "",
//!         "geometry": null,
//!         "properties": {
//!             "datetime": "2024-01-01T00:00:00Z",
//!             "title": "Harbour survey",
//!             "projectNumber": "11209233-002",
//!             "description": "",
//!             "location": "Rotterdam",
//!             "license": null
//!         },
//!         "links": [{"rel": "collection", "href": "https://dms.example.com/collections/surveys"}],
//!         "assets": {}
//!     }),
//!     FromDictOptions::default(),
//! )?;
//!
//! assert_eq!(item.title(), "Harbour survey");
//! assert_eq!(item.collection_id(), Some("surveys"));
//! # Ok::<(), dmsuite::Error>(())
//! ```

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::stac::{rel, Asset, FromDictOptions, Item, ItemParams, Link};

/// Property key of the title.
pub const TITLE: &str = "title";
/// Property key of the project number.
pub const PROJECT_NUMBER: &str = "projectNumber";
/// Property key of the description.
pub const DESCRIPTION: &str = "description";
/// Property key of the location.
pub const LOCATION: &str = "location";
/// Property key of the license.
pub const LICENSE: &str = "license";

/// Keys that must be present in the property bag of a stored item.
pub const REQUIRED_PROPERTIES: [&str; 5] = [TITLE, PROJECT_NUMBER, DESCRIPTION, LOCATION, LICENSE];

/// Top-level key holding an explicit collection identifier.
pub const COLLECTION_ID: &str = "collectionId";

/// The descriptive fields a [`DmsItem`] adds to a STAC item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptiveFields {
    /// Human readable title.
    pub title: String,
    /// Project the item was produced for.
    pub project_number: String,
    /// Free-form description, empty by default.
    pub description: String,
    /// Site or area the item covers.
    pub location: String,
    /// License identifier, if any.
    pub license: Option<String>,
}

impl DescriptiveFields {
    /// Create the fields with an empty description and no license.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        project_number: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            project_number: project_number.into(),
            description: String::new(),
            location: location.into(),
            license: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the license.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    /// Read the fields back out of a property bag.
    ///
    /// All five keys must be present. `description` and `license` may be
    /// `null`; the others must be strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingProperties`] naming every absent key, or
    /// [`Error::InvalidProperty`] for the first value of the wrong type.
    pub fn from_properties(properties: &Map<String, Value>) -> Result<Self> {
        let missing: Vec<&'static str> = REQUIRED_PROPERTIES
            .iter()
            .copied()
            .filter(|key| !properties.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingProperties { fields: missing });
        }

        Ok(Self {
            title: required_string(properties, TITLE)?,
            project_number: required_string(properties, PROJECT_NUMBER)?,
            description: nullable_string(properties, DESCRIPTION)?.unwrap_or_default(),
            location: required_string(properties, LOCATION)?,
            license: nullable_string(properties, LICENSE)?,
        })
    }

    /// Write the fields into a property bag, replacing earlier values.
    pub fn write_into(&self, properties: &mut Map<String, Value>) {
        properties.insert(TITLE.to_string(), Value::String(self.title.clone()));
        properties.insert(
            PROJECT_NUMBER.to_string(),
            Value::String(self.project_number.clone()),
        );
        properties.insert(
            DESCRIPTION.to_string(),
            Value::String(self.description.clone()),
        );
        properties.insert(LOCATION.to_string(), Value::String(self.location.clone()));
        properties.insert(
            LICENSE.to_string(),
            self.license.clone().map_or(Value::Null, Value::String),
        );
    }
}

fn required_string(properties: &Map<String, Value>, key: &'static str) -> Result<String> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(Error::InvalidProperty {
            name: key,
            expected: "a string",
        })
}

fn nullable_string(properties: &Map<String, Value>, key: &'static str) -> Result<Option<String>> {
    match properties.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::InvalidProperty {
            name: key,
            expected: "a string or null",
        }),
    }
}

/// Work out which collection an item belongs to.
///
/// In order of precedence:
/// 1. `explicit`, the raw `collectionId` value, when the key was present.
///    Strings are taken as they are, numbers and booleans in their JSON
///    text form, and `null` means no collection;
/// 2. the last path segment of the item's `collection` link;
/// 3. nothing.
///
/// An array or object under `collectionId` cannot name a collection; it is
/// logged and treated as no collection.
#[must_use]
pub fn resolve_collection_id(explicit: Option<&Value>, item: &Item) -> Option<String> {
    match explicit {
        Some(Value::String(id)) => Some(id.clone()),
        Some(Value::Null) => None,
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Some(scalar.to_string()),
        Some(other) => {
            warn!(id = %item.id, value = %other, "ignoring non-scalar collectionId");
            None
        }
        None => item
            .get_single_link(rel::COLLECTION)
            .map(|link| collection_id_from_href(&link.href)),
    }
}

/// The last `/`-separated segment of `href`.
///
/// A trailing slash yields an empty segment.
#[must_use]
pub fn collection_id_from_href(href: &str) -> String {
    href.rsplit('/').next().unwrap_or_default().to_owned()
}

/// A STAC item with the Data Management Suite descriptive fields.
///
/// The descriptive fields live in the wrapped item's property bag and are
/// always present there.
#[derive(Debug, Clone, PartialEq)]
pub struct DmsItem {
    item: Item,
}

impl DmsItem {
    /// Create an item.
    ///
    /// `params.collection` is the collection reference. The descriptive fields
    /// overwrite any values under the same keys in `params.properties`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] if the underlying STAC item is invalid.
    pub fn new(fields: DescriptiveFields, params: ItemParams) -> Result<Self> {
        let item = Item::new(params)?;
        Ok(Self::from_parts(fields, item))
    }

    fn from_parts(fields: DescriptiveFields, mut item: Item) -> Self {
        fields.write_into(&mut item.properties);
        Self { item }
    }

    /// Read an item from its JSON form, leaving the input untouched.
    ///
    /// # Errors
    ///
    /// See [`DmsItem::from_value`].
    pub fn from_dict(dict: &Value, options: FromDictOptions) -> Result<Self> {
        Self::from_value(dict.clone(), options)
    }

    /// Read an item from its JSON form.
    ///
    /// The collection is resolved with [`resolve_collection_id`]; a top-level
    /// `collectionId` key is consumed and does not end up in the item's extra
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns whatever [`Item::from_value`] returns for malformed STAC input,
    /// [`Error::MissingProperties`] if any descriptive field is absent, and
    /// [`Error::InvalidProperty`] if one has the wrong type.
    pub fn from_value(value: Value, options: FromDictOptions) -> Result<Self> {
        let explicit = value.get(COLLECTION_ID).cloned();

        let mut item = Item::from_value(value, options)?;
        item.extra_fields.remove(COLLECTION_ID);

        let collection = resolve_collection_id(explicit.as_ref(), &item);
        let fields = DescriptiveFields::from_properties(&item.properties)?;
        item.collection = collection;

        debug!(
            id = %item.id,
            collection = ?item.collection,
            explicit = explicit.is_some(),
            "read catalog item"
        );
        Ok(Self::from_parts(fields, item))
    }

    /// Serialize to the JSON form.
    ///
    /// Besides the standard `collection` field, the collection reference is
    /// written as `collectionId` so that [`DmsItem::from_value`] reads it back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        let mut value = self.item.to_value()?;
        if let (Some(id), Value::Object(map)) = (&self.item.collection, &mut value) {
            map.insert(COLLECTION_ID.to_string(), Value::String(id.clone()));
        }
        Ok(value)
    }

    /// Item identifier, empty until assigned.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Whether an identifier has been assigned.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.item.id.is_empty()
    }

    /// Assign the identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.item.id = id.into();
    }

    /// The title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.property_str(TITLE).unwrap_or_default()
    }

    /// The project number.
    #[must_use]
    pub fn project_number(&self) -> &str {
        self.property_str(PROJECT_NUMBER).unwrap_or_default()
    }

    /// The description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.property_str(DESCRIPTION).unwrap_or_default()
    }

    /// The location.
    #[must_use]
    pub fn location(&self) -> &str {
        self.property_str(LOCATION).unwrap_or_default()
    }

    /// The license.
    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.property_str(LICENSE)
    }

    /// All descriptive fields.
    #[must_use]
    pub fn fields(&self) -> DescriptiveFields {
        DescriptiveFields {
            title: self.title().to_string(),
            project_number: self.project_number().to_string(),
            description: self.description().to_string(),
            location: self.location().to_string(),
            license: self.license().map(str::to_owned),
        }
    }

    /// Replace the descriptive fields.
    pub fn set_fields(&mut self, fields: &DescriptiveFields) {
        fields.write_into(&mut self.item.properties);
    }

    fn property_str(&self, key: &str) -> Option<&str> {
        self.item.properties.get(key).and_then(Value::as_str)
    }

    /// The collection reference.
    #[must_use]
    pub fn collection_id(&self) -> Option<&str> {
        self.item.collection.as_deref()
    }

    /// Set or clear the collection reference.
    pub fn set_collection_id(&mut self, collection: Option<String>) {
        self.item.collection = collection;
    }

    /// Add a link to the underlying item.
    pub fn add_link(&mut self, link: Link) {
        self.item.add_link(link);
    }

    /// Add or replace an asset.
    pub fn insert_asset(&mut self, key: impl Into<String>, asset: Asset) {
        self.item.assets.insert(key.into(), asset);
    }

    /// The underlying STAC item.
    #[must_use]
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Unwrap into the underlying STAC item.
    #[must_use]
    pub fn into_item(self) -> Item {
        self.item
    }
}

impl TryFrom<Value> for DmsItem {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value, FromDictOptions::default())
    }
}

impl From<DmsItem> for Item {
    fn from(item: DmsItem) -> Self {
        item.into_item()
    }
}
