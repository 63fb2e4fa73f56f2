//! k8s manifest provider
//!
//! Exposes Kubernetes custom resources (Kiali, ScyllaCluster, or any CRD
//! loaded at startup) as Terraform-style resources. Applying a resource
//! renders its manifest into the computed `yaml` attribute; no request is
//! ever sent to a cluster.
//!
//! - [`translate`] builds each resource's attribute schema from the CRD's
//!   OpenAPI schema
//! - [`manifest`] converts configuration into the manifest (JSON keys, null
//!   values dropped, int-or-string handling)
//! - [`resource::CrdResource`] implements the lifecycle for every kind
//! - [`provider::K8sProvider`] registers one resource per catalog entry

pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod naming;
pub mod provider;
pub mod resource;
pub mod translate;
pub mod validators;

pub use config::ProviderConfig;
pub use error::{ProviderError, SchemaError};
pub use manifest::{ManifestBuilder, render_yaml};
pub use model::{MetadataModel, ResourceModel};
pub use provider::K8sProvider;
pub use resource::CrdResource;
