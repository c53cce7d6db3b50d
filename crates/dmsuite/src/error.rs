//! Error types for dmsuite.
//!
//! This module defines all error types used throughout the dmsuite crate,
//! covering item construction, deserialization, and configuration.

use thiserror::Error;

/// The main error type for dmsuite operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Item Errors ===
    /// One or more required descriptive properties are missing.
    #[error("missing required item properties: {}", .fields.join(", "))]
    MissingProperties {
        /// Keys that were absent from the property bag.
        fields: Vec<&'static str>,
    },

    /// A descriptive property is present but has the wrong JSON type.
    #[error("item property '{name}' must be {expected}")]
    InvalidProperty {
        /// Property key.
        name: &'static str,
        /// Description of the accepted type.
        expected: &'static str,
    },

    /// The generic item structure is malformed.
    #[error("invalid item: {message}")]
    InvalidItem {
        /// Description of what is wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for dmsuite operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid item error.
    #[must_use]
    pub fn invalid_item(message: impl Into<String>) -> Self {
        Self::InvalidItem {
            message: message.into(),
        }
    }

    /// Create a new configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error reports missing required properties.
    #[must_use]
    pub fn is_missing_property(&self) -> bool {
        matches!(self, Self::MissingProperties { .. })
    }

    /// The missing property keys, if this is a missing-properties error.
    #[must_use]
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            Self::MissingProperties { fields } => fields,
            _ => &[],
        }
    }
}
