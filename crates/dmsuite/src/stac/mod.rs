//! Generic STAC item model.
//!
//! The types here mirror the STAC Item JSON layout closely enough that any
//! conforming item can be read and written back without losing fields.
//! Unknown top-level keys are carried in `extra_fields`, and the property bag
//! is an untyped JSON map so that typed records such as
//! [`DmsItem`](crate::DmsItem) can layer their own fields on top of it.
//!
//! Link resolution and extension schemas are not modelled; links are plain
//! data and extensions are a list of schema URIs.

mod asset;
mod geometry;
mod item;
mod link;

pub use asset::Asset;
pub use geometry::{Geometry, GEOMETRY_TYPES};
pub use item::{FromDictOptions, Item, ItemParams, ITEM_TYPE, STAC_VERSION};
pub use link::{rel, Link};
