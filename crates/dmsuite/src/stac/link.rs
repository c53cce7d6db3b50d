//! Item links.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known link relation types.
pub mod rel {
    /// Absolute location of the item itself.
    pub const SELF: &str = "self";
    /// The root catalog.
    pub const ROOT: &str = "root";
    /// The parent object.
    pub const PARENT: &str = "parent";
    /// The collection the item belongs to.
    pub const COLLECTION: &str = "collection";
}

/// A link from an item to a related resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Relation type, e.g. `collection`.
    pub rel: String,

    /// Target reference.
    pub href: String,

    /// Media type of the target.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    /// Human readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Any other fields present on the link object.
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl Link {
    /// Create a link with the given relation and target.
    #[must_use]
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            media_type: None,
            title: None,
            extra_fields: Map::new(),
        }
    }

    /// Create a `collection` link.
    #[must_use]
    pub fn collection(href: impl Into<String>) -> Self {
        Self::new(rel::COLLECTION, href).with_media_type("application/json")
    }

    /// Set the media type.
    #[must_use]
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check whether this link has the given relation type.
    #[must_use]
    pub fn is_rel(&self, rel: &str) -> bool {
        self.rel == rel
    }
}
