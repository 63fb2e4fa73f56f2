//! Resource trait and lifecycle request/response types
//!
//! Handlers receive a request and fill in a response. Failures are reported
//! by adding error diagnostics to the response, never by returning an error.

use crate::diagnostics::Diagnostics;
use crate::schema::Schema;
use crate::state::{Config, State};

/// Request for the resource type name
#[derive(Debug, Clone, Default)]
pub struct MetadataRequest {
    /// Type name of the provider serving the resource (e.g. `k8s`)
    pub provider_type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct MetadataResponse {
    /// Full resource type name (e.g. `k8s_kiali_io_kiali_v1alpha1`)
    pub type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaResponse {
    pub schema: Schema,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateConfigRequest {
    pub config: Config,
}

#[derive(Debug, Clone, Default)]
pub struct ValidateConfigResponse {
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub config: Config,
}

/// Create result; `state` starts empty and stays empty on failure
#[derive(Debug, Clone, Default)]
pub struct CreateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct ReadRequest {
    pub state: State,
}

/// Read result; `state` starts as a copy of the request state
#[derive(Debug, Clone, Default)]
pub struct ReadResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub config: Config,
    pub prior_state: State,
}

/// Update result; `state` starts empty, the prior state is kept on failure
#[derive(Debug, Clone, Default)]
pub struct UpdateResponse {
    pub state: State,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    pub state: State,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteResponse {
    pub diagnostics: Diagnostics,
}

/// A managed resource type
///
/// One value serves every instance of the type; handlers must not keep
/// per-instance data between calls.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Fills in the resource type name
    fn metadata(&self, req: &MetadataRequest, resp: &mut MetadataResponse);

    /// Fills in the resource schema
    fn schema(&self, resp: &mut SchemaResponse);

    /// Resource-specific configuration checks, run after the schema checks
    async fn validate_config(&self, _req: &ValidateConfigRequest, _resp: &mut ValidateConfigResponse) {}

    async fn create(&self, req: &CreateRequest, resp: &mut CreateResponse);

    async fn read(&self, req: &ReadRequest, resp: &mut ReadResponse);

    async fn update(&self, req: &UpdateRequest, resp: &mut UpdateResponse);

    async fn delete(&self, req: &DeleteRequest, resp: &mut DeleteResponse);
}
