//! CRD-backed resource
//!
//! One generic resource serves every catalog entry. Create and Update both
//! render the manifest from scratch; Read and Delete have nothing to do since
//! the stored state is the only copy of the object.

use crate::error::SchemaError;
use crate::manifest::{ManifestBuilder, render_yaml};
use crate::model::{ResourceModel, now_nanos};
use crate::naming;
use crate::translate::resource_schema;
use crds::{CatalogEntry, CrdKind, OpenApiSchema};
use plugin_framework::{
    Config, CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, Diagnostics, MetadataRequest,
    MetadataResponse, ReadRequest, ReadResponse, Resource, Schema, SchemaResponse, UpdateRequest,
    UpdateResponse, ValidateConfigRequest, ValidateConfigResponse,
};
use tracing::{debug, info};

/// Resource rendering manifests of one CRD kind
#[derive(Debug, Clone)]
pub struct CrdResource {
    kind: CrdKind,
    spec_schema: Option<OpenApiSchema>,
    schema: Schema,
}

impl CrdResource {
    /// Translates the entry's schema once; it is reused for every call
    pub fn new(entry: &CatalogEntry) -> Result<Self, SchemaError> {
        Ok(Self {
            kind: entry.kind.clone(),
            spec_schema: entry.spec_schema().cloned(),
            schema: resource_schema(entry)?,
        })
    }

    fn manifest_builder(&self) -> ManifestBuilder<'_> {
        ManifestBuilder::new(&self.kind, self.spec_schema.as_ref())
    }

    /// Decodes the config and renders it; `None` when diagnostics were added
    fn render(&self, config: &Config, diagnostics: &mut Diagnostics) -> Option<ResourceModel> {
        let mut model: ResourceModel = match config.get() {
            Ok(model) => model,
            Err(errors) => {
                diagnostics.append(errors);
                return None;
            }
        };

        let manifest = match self.manifest_builder().build(&model) {
            Ok(manifest) => manifest,
            Err(errors) => {
                diagnostics.append(errors);
                return None;
            }
        };

        model.api_version = Some(self.kind.api_version());
        model.kind = Some(self.kind.kind.clone());
        model.id = Some(now_nanos());

        match render_yaml(&manifest) {
            Ok(yaml) => model.yaml = Some(yaml),
            Err(e) => {
                diagnostics.add_error("Could not generate YAML", e.to_string());
                return None;
            }
        }
        Some(model)
    }
}

#[async_trait::async_trait]
impl Resource for CrdResource {
    fn metadata(&self, req: &MetadataRequest, resp: &mut MetadataResponse) {
        resp.type_name = naming::type_name(&req.provider_type_name, &self.kind);
    }

    fn schema(&self, resp: &mut SchemaResponse) {
        resp.schema = self.schema.clone();
    }

    async fn validate_config(&self, req: &ValidateConfigRequest, resp: &mut ValidateConfigResponse) {
        if self.kind.deprecated {
            resp.diagnostics.add_warning(
                "Deprecated API version",
                format!("{} {} is deprecated by its CRD", self.kind.kind, self.kind.api_version()),
            );
        }

        let model: ResourceModel = match req.config.get() {
            Ok(model) => model,
            Err(errors) => {
                resp.diagnostics.append(errors);
                return;
            }
        };
        if let Err(errors) = self.manifest_builder().build(&model) {
            resp.diagnostics.append(errors);
        }
    }

    async fn create(&self, req: &CreateRequest, resp: &mut CreateResponse) {
        debug!("Creating {} manifest", self.kind.kind);
        let Some(model) = self.render(&req.config, &mut resp.diagnostics) else {
            return;
        };
        let diagnostics = resp.state.set(&model);
        resp.diagnostics.append(diagnostics);
        info!("Rendered {} {}", self.kind.kind, model.metadata.name);
    }

    async fn read(&self, _req: &ReadRequest, _resp: &mut ReadResponse) {
        debug!("Read {}: state is authoritative", self.kind.kind);
    }

    async fn update(&self, req: &UpdateRequest, resp: &mut UpdateResponse) {
        debug!("Updating {} manifest", self.kind.kind);
        let Some(model) = self.render(&req.config, &mut resp.diagnostics) else {
            return;
        };
        let diagnostics = resp.state.set(&model);
        resp.diagnostics.append(diagnostics);
        info!("Re-rendered {} {}", self.kind.kind, model.metadata.name);
    }

    async fn delete(&self, _req: &DeleteRequest, _resp: &mut DeleteResponse) {
        debug!("Delete {}: nothing to remove", self.kind.kind);
    }
}

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;
