//! Provider trait

use crate::diagnostics::Diagnostics;
use crate::resource::Resource;
use crate::schema::Schema;
use crate::state::Config;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ProviderMetadataResponse {
    /// Prefix of every resource type name (e.g. `k8s`)
    pub type_name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureRequest {
    pub config: Config,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigureResponse {
    pub diagnostics: Diagnostics,
}

/// A provider: a named set of resource types plus its own configuration block
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn metadata(&self, resp: &mut ProviderMetadataResponse);

    /// Schema of the provider configuration block
    fn schema(&self, resp: &mut ProviderSchemaResponse);

    async fn configure(&self, req: &ConfigureRequest, resp: &mut ConfigureResponse);

    /// Every resource type the provider serves
    fn resources(&self) -> Vec<Arc<dyn Resource>>;
}
