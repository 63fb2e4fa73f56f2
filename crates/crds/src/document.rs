//! CRD documents
//!
//! Wraps a parsed `CustomResourceDefinition` and exposes the pieces the
//! provider needs: names, scope, served versions and per-version schemas.

use crate::catalog::CrdKind;
use crate::error::CrdError;
use crate::schema::OpenApiSchema;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinition, CustomResourceDefinitionVersion,
};
use serde::Deserialize;
use tracing::debug;

const CRD_KIND: &str = "CustomResourceDefinition";

/// A CustomResourceDefinition loaded from YAML
#[derive(Debug, Clone)]
pub struct CrdDocument {
    crd: CustomResourceDefinition,
}

impl CrdDocument {
    /// Parses a CRD from YAML (or JSON)
    ///
    /// `source_name` is only used in error messages (file name or builtin id).
    pub fn parse(source_name: &str, source: &str) -> Result<Self, CrdError> {
        let crd: CustomResourceDefinition =
            serde_yaml::from_str(source).map_err(|error| CrdError::Parse {
                source_name: source_name.to_string(),
                error,
            })?;
        debug!(
            "Loaded CRD {} ({} versions)",
            crd.metadata.name.as_deref().unwrap_or("<unnamed>"),
            crd.spec.versions.len()
        );
        Ok(Self { crd })
    }

    /// Parses every CRD of a multi-document YAML stream (`---` separated)
    ///
    /// Empty documents and documents of any other kind are skipped, so
    /// bundles mixing CRDs with namespaces or RBAC objects load as-is.
    pub fn parse_all(source_name: &str, source: &str) -> Result<Vec<Self>, CrdError> {
        let parse_error = |error| CrdError::Parse {
            source_name: source_name.to_string(),
            error,
        };

        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(source) {
            let value = serde_yaml::Value::deserialize(document).map_err(parse_error)?;
            if value.is_null() {
                continue;
            }
            let kind = value.get("kind").and_then(serde_yaml::Value::as_str);
            if kind != Some(CRD_KIND) {
                debug!("Skipping {} document in {}", kind.unwrap_or("<untyped>"), source_name);
                continue;
            }
            let crd: CustomResourceDefinition = serde_yaml::from_value(value).map_err(parse_error)?;
            documents.push(Self { crd });
        }
        Ok(documents)
    }

    /// `metadata.name` of the CRD, falling back to `<plural>.<group>`
    pub fn name(&self) -> String {
        self.crd
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| format!("{}.{}", self.plural(), self.group()))
    }

    /// API group (e.g. `kiali.io`)
    pub fn group(&self) -> &str {
        &self.crd.spec.group
    }

    /// Kind (e.g. `Kiali`)
    pub fn kind(&self) -> &str {
        &self.crd.spec.names.kind
    }

    /// Plural resource name (e.g. `kialis`)
    pub fn plural(&self) -> &str {
        &self.crd.spec.names.plural
    }

    /// Whether objects of this kind live in a namespace
    pub fn namespaced(&self) -> bool {
        self.crd.spec.scope == "Namespaced"
    }

    /// Names of the versions the API server would serve
    pub fn served_versions(&self) -> impl Iterator<Item = &str> {
        self.crd
            .spec
            .versions
            .iter()
            .filter(|v| v.served)
            .map(|v| v.name.as_str())
    }

    /// The lookup-table entry for `version`
    pub fn kind_for(&self, version: &str) -> Result<CrdKind, CrdError> {
        let version = self.version(version)?;
        Ok(CrdKind {
            group: self.group().to_string(),
            version: version.name.clone(),
            kind: self.kind().to_string(),
            plural: self.plural().to_string(),
            namespaced: self.namespaced(),
            deprecated: version.deprecated.unwrap_or(false),
        })
    }

    /// The full `openAPIV3Schema` of `version`
    pub fn schema_for(&self, version: &str) -> Result<OpenApiSchema, CrdError> {
        let props = self
            .version(version)?
            .schema
            .as_ref()
            .and_then(|s| s.open_api_v3_schema.as_ref())
            .ok_or_else(|| CrdError::MissingSchema {
                crd: self.name(),
                version: version.to_string(),
            })?;

        // JSONSchemaProps serializes with the OpenAPI keyword names, which the
        // engine's schema model reads back
        serde_json::to_value(props)
            .and_then(serde_json::from_value)
            .map_err(|error| CrdError::Schema {
                crd: self.name(),
                version: version.to_string(),
                error,
            })
    }

    fn version(&self, version: &str) -> Result<&CustomResourceDefinitionVersion, CrdError> {
        self.crd
            .spec
            .versions
            .iter()
            .find(|v| v.name == version)
            .ok_or_else(|| CrdError::VersionNotFound {
                crd: self.name(),
                version: version.to_string(),
            })
    }
}
