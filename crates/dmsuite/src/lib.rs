//! `dmsuite` - Typed catalog items for the Data Management Suite
//!
//! This library extends STAC items with the descriptive fields the Data
//! Management Suite requires (title, project number, description, location
//! and license) and recovers an item's collection when reading it back.
//! GeoNetwork metadata records can be imported as plain STAC items.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod geonetwork;
pub mod item;
pub mod logging;
pub mod stac;
pub mod temporal;

pub use config::Config;
pub use error::{Error, Result};
pub use geonetwork::GeonetworkRecord;
pub use item::{resolve_collection_id, DescriptiveFields, DmsItem};
pub use logging::init_logging;
pub use stac::{FromDictOptions, Item, ItemParams};
pub use temporal::Temporal;
