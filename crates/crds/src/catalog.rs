//! CRD catalog
//!
//! The group/version/kind lookup table. Each entry pairs the literal
//! `apiVersion`/`kind` stamped onto rendered manifests with the schema of
//! that CRD version.

use crate::document::CrdDocument;
use crate::error::CrdError;
use crate::schema::OpenApiSchema;
use inflector::Inflector;
use kube::core::{ApiResource, GroupVersionKind};
use tracing::{debug, info};

/// CRDs compiled into the provider, as (source name, YAML)
const BUILTIN_CRDS: &[(&str, &str)] = &[
    (
        "kiali.io_kialis.yaml",
        include_str!("../manifests/kiali.io_kialis.yaml"),
    ),
    (
        "scylla.scylladb.com_scyllaclusters.yaml",
        include_str!("../manifests/scylla.scylladb.com_scyllaclusters.yaml"),
    ),
];

/// Group/version/kind of one served CRD version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrdKind {
    /// API group (e.g. `scylla.scylladb.com`)
    pub group: String,

    /// Version (e.g. `v1`)
    pub version: String,

    /// Kind (e.g. `ScyllaCluster`)
    pub kind: String,

    /// Plural resource name (e.g. `scyllaclusters`)
    pub plural: String,

    /// Whether objects of this kind live in a namespace
    pub namespaced: bool,

    /// Whether the CRD marks this version as deprecated
    pub deprecated: bool,
}

impl CrdKind {
    /// `apiVersion` literal for manifests of this kind (`group/version`)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }

    /// kube's view of this kind, used to stamp `DynamicObject` type metadata
    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(&self.gvk(), &self.plural)
    }

    /// Type name suffix: `<group>_<kind>_<version>` with the group's `.`/`-`
    /// replaced and the kind in snake_case
    ///
    /// e.g. `kiali_io_kiali_v1alpha1`, `scylla_scylladb_com_scylla_cluster_v1`
    pub fn type_suffix(&self) -> String {
        let group = self.group.replace(['.', '-'], "_");
        let kind = self.kind.to_snake_case();
        if group.is_empty() {
            format!("{}_{}", kind, self.version)
        } else {
            format!("{}_{}_{}", group, kind, self.version)
        }
    }
}

/// One lookup-table entry: a kind plus the full schema of its version
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub kind: CrdKind,
    pub schema: OpenApiSchema,
}

impl CatalogEntry {
    /// Schema of the object's `spec`, if the CRD declares one
    pub fn spec_schema(&self) -> Option<&OpenApiSchema> {
        self.schema.property("spec")
    }

    /// Top-level description of the CRD version
    pub fn description(&self) -> Option<&str> {
        self.schema.description.as_deref()
    }
}

/// Lookup table of every served CRD version, keyed by type name suffix
#[derive(Debug, Clone, Default)]
pub struct CrdCatalog {
    entries: Vec<CatalogEntry>,
}

impl CrdCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the CRDs compiled into the provider
    pub fn builtin() -> Result<Self, CrdError> {
        let documents = BUILTIN_CRDS
            .iter()
            .map(|(name, source)| CrdDocument::parse(name, source))
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = Self::from_documents(documents)?;
        info!("Loaded {} builtin CRD kinds", catalog.len());
        Ok(catalog)
    }

    /// Builds a catalog from CRD documents, one entry per served version
    pub fn from_documents(
        documents: impl IntoIterator<Item = CrdDocument>,
    ) -> Result<Self, CrdError> {
        let mut catalog = Self::new();
        for document in documents {
            catalog.add_document(&document)?;
        }
        Ok(catalog)
    }

    /// Adds every served version of `document`
    ///
    /// Served versions without a schema are rejected; the provider cannot
    /// describe attributes for them.
    pub fn add_document(&mut self, document: &CrdDocument) -> Result<(), CrdError> {
        for version in document.served_versions() {
            let kind = document.kind_for(version)?;
            let suffix = kind.type_suffix();
            if self.get(&suffix).is_some() {
                return Err(CrdError::Duplicate(suffix));
            }
            let schema = document.schema_for(version)?;
            debug!("Registered CRD kind {} ({})", kind.kind, suffix);
            self.entries.push(CatalogEntry { kind, schema });
        }
        Ok(())
    }

    /// Entry for a type name suffix such as `kiali_io_kiali_v1alpha1`
    pub fn get(&self, type_suffix: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind.type_suffix() == type_suffix)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
