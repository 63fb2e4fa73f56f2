//! k8s provider
//!
//! Serves one [`CrdResource`] per catalog entry. The provider block takes no
//! configuration; nothing talks to a cluster.

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resource::CrdResource;
use crds::CrdCatalog;
use plugin_framework::{
    ConfigureRequest, ConfigureResponse, Provider, ProviderMetadataResponse, ProviderSchemaResponse, Resource,
    Schema,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Provider rendering Kubernetes manifests for catalog CRDs
#[derive(Debug, Clone)]
pub struct K8sProvider {
    config: ProviderConfig,
    resources: Vec<Arc<CrdResource>>,
}

impl K8sProvider {
    /// Builds a resource for every entry of `catalog`
    pub fn new(config: ProviderConfig, catalog: &CrdCatalog) -> Result<Self, ProviderError> {
        config.validate()?;
        let resources = catalog
            .iter()
            .map(|entry| CrdResource::new(entry).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            "Provider {} built with {} resource kinds",
            config.type_name,
            resources.len()
        );
        Ok(Self { config, resources })
    }

    /// Loads the catalog described by `config` and builds the provider
    pub fn from_config(config: ProviderConfig) -> Result<Self, ProviderError> {
        let catalog = config.load_catalog()?;
        Self::new(config, &catalog)
    }
}

#[async_trait::async_trait]
impl Provider for K8sProvider {
    fn metadata(&self, resp: &mut ProviderMetadataResponse) {
        resp.type_name.clone_from(&self.config.type_name);
        resp.version = env!("CARGO_PKG_VERSION").to_string();
    }

    fn schema(&self, resp: &mut ProviderSchemaResponse) {
        resp.schema = Schema::new().with_description(
            "Renders Kubernetes manifests for custom resources. The provider block takes no arguments.",
        );
    }

    async fn configure(&self, _req: &ConfigureRequest, _resp: &mut ConfigureResponse) {
        debug!("Provider {} configured", self.config.type_name);
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        self.resources
            .iter()
            .map(|resource| Arc::clone(resource) as Arc<dyn Resource>)
            .collect()
    }
}
