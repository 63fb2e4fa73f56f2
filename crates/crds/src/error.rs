//! CRD loading errors

use thiserror::Error;

/// Errors that can occur while loading CRD documents into the catalog
#[derive(Debug, Error)]
pub enum CrdError {
    /// The document is not a valid CustomResourceDefinition
    #[error("Invalid CRD document {source_name}: {error}")]
    Parse {
        source_name: String,
        #[source]
        error: serde_yaml::Error,
    },

    /// The requested version is not declared by the CRD
    #[error("CRD {crd} has no version {version}")]
    VersionNotFound { crd: String, version: String },

    /// The version exists but carries no openAPIV3Schema
    #[error("CRD {crd} version {version} has no openAPIV3Schema")]
    MissingSchema { crd: String, version: String },

    /// The openAPIV3Schema could not be read into the engine's schema model
    #[error("Invalid openAPIV3Schema in CRD {crd} version {version}: {error}")]
    Schema {
        crd: String,
        version: String,
        #[source]
        error: serde_json::Error,
    },

    /// Two documents declare the same group/kind/version
    #[error("Duplicate CRD kind: {0}")]
    Duplicate(String),
}
