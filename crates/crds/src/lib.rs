//! CRD Definitions
//!
//! CustomResourceDefinitions exposed by the k8s manifest provider, shipped as data.
//!
//! Every resource kind the provider serves comes from a CRD document: its
//! group/version/kind triple goes into the [`CrdCatalog`] lookup table and its
//! `openAPIV3Schema` becomes the [`OpenApiSchema`] the provider interprets.

pub mod catalog;
pub mod document;
pub mod error;
pub mod schema;

pub use catalog::*;
pub use document::*;
pub use error::*;
pub use schema::*;
