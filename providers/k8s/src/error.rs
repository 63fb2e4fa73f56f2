//! Provider error types
//!
//! Lifecycle handlers report problems as diagnostics; these errors cover
//! provider construction (catalog loading, schema translation, configuration).

use crds::CrdError;
use thiserror::Error;

/// Errors raised while translating a CRD schema into attributes
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two CRD keys map to the same attribute name
    #[error("{path}: CRD keys {first:?} and {second:?} both map to attribute {name:?}")]
    DuplicateAttribute {
        path: String,
        name: String,
        first: String,
        second: String,
    },
}

/// Errors that can occur while building the provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// CRD document or catalog error
    #[error("CRD error: {0}")]
    Crd(#[from] CrdError),

    /// Schema translation error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Reading a CRD file failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
