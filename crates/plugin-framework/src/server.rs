//! Provider server
//!
//! Drives a [`Provider`] the way Terraform core does: resources are looked up
//! by full type name, configuration is checked against the schema, changes
//! are planned from (prior state, config) and applied by dispatching to the
//! Create/Update/Delete handlers.
//!
//! Lifecycle of one resource instance:
//!
//! ```text
//! {absent} --Create--> {present} --Update--> {present} --Delete--> {absent}
//! ```

use crate::diagnostics::Diagnostics;
use crate::path::AttributePath;
use crate::provider::{ConfigureRequest, ConfigureResponse, Provider, ProviderMetadataResponse, ProviderSchemaResponse};
use crate::resource::{
    CreateRequest, CreateResponse, DeleteRequest, DeleteResponse, MetadataRequest, MetadataResponse,
    ReadRequest, ReadResponse, Resource, SchemaResponse, UpdateRequest, UpdateResponse,
    ValidateConfigRequest, ValidateConfigResponse,
};
use crate::state::{Config, State};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What applying a plan will do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedAction {
    NoOp,
    Create,
    Update,
    /// Delete then create
    Replace,
    Delete,
}

/// Result of planning a change
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub action: PlannedAction,

    /// State expected after apply; `None` when the resource goes away
    pub planned_state: Option<Value>,

    /// Attributes only known after apply (computed values)
    pub unknown: Vec<AttributePath>,

    /// Changed attributes that force a replacement
    pub requires_replace: Vec<AttributePath>,

    pub diagnostics: Diagnostics,
}

impl PlanResponse {
    fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            action: PlannedAction::NoOp,
            planned_state: None,
            unknown: Vec::new(),
            requires_replace: Vec::new(),
            diagnostics,
        }
    }
}

/// Result of applying a change
#[derive(Debug, Clone, Serialize)]
pub struct ApplyResponse {
    pub action: PlannedAction,

    /// State after apply; `None` when the resource does not exist
    pub new_state: Option<Value>,

    pub diagnostics: Diagnostics,
}

/// In-process server for one provider
pub struct ProviderServer {
    provider: Arc<dyn Provider>,
    metadata: ProviderMetadataResponse,
    resources: BTreeMap<String, Arc<dyn Resource>>,
}

impl fmt::Debug for ProviderServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderServer")
            .field("type_name", &self.metadata.type_name)
            .field("version", &self.metadata.version)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ProviderServer {
    /// Indexes the provider's resources by type name
    ///
    /// Fails when a resource reports an empty or duplicate type name.
    pub fn new(provider: Arc<dyn Provider>) -> Result<Self, Diagnostics> {
        let mut metadata = ProviderMetadataResponse::default();
        provider.metadata(&mut metadata);

        let mut diagnostics = Diagnostics::new();
        let mut resources: BTreeMap<String, Arc<dyn Resource>> = BTreeMap::new();
        let request = MetadataRequest {
            provider_type_name: metadata.type_name.clone(),
        };

        for resource in provider.resources() {
            let mut resp = MetadataResponse::default();
            resource.metadata(&request, &mut resp);

            if resp.type_name.is_empty() {
                diagnostics.add_error(
                    "Missing Resource Type Name",
                    "A resource returned an empty type name from its metadata handler.",
                );
                continue;
            }
            if resources.contains_key(&resp.type_name) {
                diagnostics.add_error(
                    "Duplicate Resource Type Defined",
                    format!("The {} resource type name was returned for multiple resources.", resp.type_name),
                );
                continue;
            }
            debug!("Registered resource type {}", resp.type_name);
            resources.insert(resp.type_name, resource);
        }

        if diagnostics.has_error() {
            return Err(diagnostics);
        }

        info!(
            "Provider {} {} serving {} resource types",
            metadata.type_name,
            metadata.version,
            resources.len()
        );
        Ok(Self {
            provider,
            metadata,
            resources,
        })
    }

    /// Provider type name (prefix of every resource type name)
    pub fn type_name(&self) -> &str {
        &self.metadata.type_name
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    /// Resource type names, sorted
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn provider_schema(&self) -> ProviderSchemaResponse {
        let mut resp = ProviderSchemaResponse::default();
        self.provider.schema(&mut resp);
        resp
    }

    /// Checks the provider block against its schema, then configures
    pub async fn configure_provider(&self, config: &Value) -> Diagnostics {
        let schema = self.provider_schema();
        let mut diagnostics = schema.diagnostics;
        diagnostics.append(schema.schema.validate(config));
        if diagnostics.has_error() {
            return diagnostics;
        }

        let req = ConfigureRequest {
            config: Config::new(config.clone()),
        };
        let mut resp = ConfigureResponse::default();
        self.provider.configure(&req, &mut resp).await;
        diagnostics.append(resp.diagnostics);
        diagnostics
    }

    pub fn resource_schema(&self, type_name: &str) -> SchemaResponse {
        match self.resource(type_name) {
            Ok(resource) => {
                let mut resp = SchemaResponse::default();
                resource.schema(&mut resp);
                resp
            }
            Err(diagnostics) => SchemaResponse {
                diagnostics,
                ..SchemaResponse::default()
            },
        }
    }

    /// Schema checks followed by the resource's own validation
    pub async fn validate_resource_config(&self, type_name: &str, config: &Value) -> Diagnostics {
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(diagnostics) => return diagnostics,
        };

        let schema = schema_of(resource);
        let mut diagnostics = schema.diagnostics;
        diagnostics.append(schema.schema.validate(config));
        if diagnostics.has_error() {
            debug!("Config for {} failed schema validation", type_name);
            return diagnostics;
        }

        let req = ValidateConfigRequest {
            config: Config::new(config.clone()),
        };
        let mut resp = ValidateConfigResponse::default();
        resource.validate_config(&req, &mut resp).await;
        diagnostics.append(resp.diagnostics);
        diagnostics
    }

    /// Plans the change from `prior` state to `config`
    ///
    /// A missing `config` plans a delete. When only read-only attributes
    /// differ the plan is a no-op and keeps the prior computed values;
    /// otherwise computed values are unknown until apply.
    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior: Option<&Value>,
        config: Option<&Value>,
    ) -> PlanResponse {
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(diagnostics) => return PlanResponse::failed(diagnostics),
        };
        let schema = schema_of(resource);
        if schema.diagnostics.has_error() {
            return PlanResponse::failed(schema.diagnostics);
        }
        let schema = schema.schema;
        let computed = schema.computed_only();

        let (action, planned_state, requires_replace) = match (prior, config) {
            (None, None) => (PlannedAction::NoOp, None, Vec::new()),
            (Some(_), None) => (PlannedAction::Delete, None, Vec::new()),
            (None, Some(config)) => (
                PlannedAction::Create,
                Some(with_computed(config, &computed, None)),
                Vec::new(),
            ),
            (Some(prior), Some(config)) => {
                let before = strip_nulls(&without(prior, &computed));
                let after = strip_nulls(&without(config, &computed));
                if before == after {
                    (
                        PlannedAction::NoOp,
                        Some(with_computed(config, &computed, Some(prior))),
                        Vec::new(),
                    )
                } else {
                    let replace: Vec<AttributePath> = schema
                        .replace_paths()
                        .into_iter()
                        .filter(|path| path.value_in(&before) != path.value_in(&after))
                        .collect();
                    let action = if replace.is_empty() {
                        PlannedAction::Update
                    } else {
                        PlannedAction::Replace
                    };
                    (action, Some(with_computed(config, &computed, None)), replace)
                }
            }
        };

        let unknown = match action {
            PlannedAction::Create | PlannedAction::Update | PlannedAction::Replace => {
                computed.iter().map(|name| AttributePath::root(*name)).collect()
            }
            PlannedAction::NoOp | PlannedAction::Delete => Vec::new(),
        };

        debug!("Planned {:?} for {}", action, type_name);
        PlanResponse {
            action,
            planned_state,
            unknown,
            requires_replace,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Applies the change from `prior` state to `config`
    ///
    /// Handler errors leave the resource as it was: a failed Create returns
    /// no state, a failed Update or Delete returns the prior state.
    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior: Option<Value>,
        config: Option<Value>,
    ) -> ApplyResponse {
        let plan = self.plan_resource_change(type_name, prior.as_ref(), config.as_ref());
        if plan.diagnostics.has_error() {
            return ApplyResponse {
                action: plan.action,
                new_state: prior,
                diagnostics: plan.diagnostics,
            };
        }
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ApplyResponse {
                    action: plan.action,
                    new_state: prior,
                    diagnostics,
                };
            }
        };

        info!("Applying {:?} to {}", plan.action, type_name);
        let (new_state, diagnostics) = match (plan.action, prior, config) {
            (PlannedAction::Create, _, Some(config)) => Self::create(resource.as_ref(), config).await,
            (PlannedAction::Update, Some(prior), Some(config)) => {
                Self::update(resource.as_ref(), prior, config).await
            }
            (PlannedAction::Replace, Some(prior), Some(config)) => {
                let (remaining, mut diagnostics) = Self::delete(resource.as_ref(), prior).await;
                if remaining.is_some() {
                    (remaining, diagnostics)
                } else {
                    let (created, created_diagnostics) = Self::create(resource.as_ref(), config).await;
                    diagnostics.append(created_diagnostics);
                    (created, diagnostics)
                }
            }
            (PlannedAction::Delete, Some(prior), _) => Self::delete(resource.as_ref(), prior).await,
            (_, prior, _) => (prior, Diagnostics::new()),
        };

        if diagnostics.has_error() {
            warn!("Applying {:?} to {} failed", plan.action, type_name);
        }
        ApplyResponse {
            action: plan.action,
            new_state,
            diagnostics,
        }
    }

    /// Refreshes a stored state through the resource's Read handler
    pub async fn read_resource(&self, type_name: &str, state: Value) -> ReadResponse {
        let resource = match self.resource(type_name) {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ReadResponse {
                    state: State::new(state),
                    diagnostics,
                };
            }
        };

        let req = ReadRequest {
            state: State::new(state),
        };
        let mut resp = ReadResponse {
            state: req.state.clone(),
            diagnostics: Diagnostics::new(),
        };
        resource.read(&req, &mut resp).await;
        resp
    }

    async fn create(resource: &dyn Resource, config: Value) -> (Option<Value>, Diagnostics) {
        let req = CreateRequest {
            config: Config::new(config),
        };
        let mut resp = CreateResponse::default();
        resource.create(&req, &mut resp).await;

        let mut diagnostics = resp.diagnostics;
        if diagnostics.has_error() {
            return (None, diagnostics);
        }
        if resp.state.is_empty() {
            diagnostics.add_error(
                "Missing Resource State After Create",
                "The Terraform provider returned no state after a successful create.",
            );
            return (None, diagnostics);
        }
        (Some(resp.state.into_raw()), diagnostics)
    }

    async fn update(resource: &dyn Resource, prior: Value, config: Value) -> (Option<Value>, Diagnostics) {
        let req = UpdateRequest {
            config: Config::new(config),
            prior_state: State::new(prior),
        };
        let mut resp = UpdateResponse::default();
        resource.update(&req, &mut resp).await;

        let mut diagnostics = resp.diagnostics;
        if diagnostics.has_error() {
            return (Some(req.prior_state.into_raw()), diagnostics);
        }
        if resp.state.is_empty() {
            diagnostics.add_error(
                "Missing Resource State After Update",
                "The Terraform provider returned no state after a successful update.",
            );
            return (Some(req.prior_state.into_raw()), diagnostics);
        }
        (Some(resp.state.into_raw()), diagnostics)
    }

    async fn delete(resource: &dyn Resource, prior: Value) -> (Option<Value>, Diagnostics) {
        let req = DeleteRequest {
            state: State::new(prior),
        };
        let mut resp = DeleteResponse::default();
        resource.delete(&req, &mut resp).await;

        if resp.diagnostics.has_error() {
            return (Some(req.state.into_raw()), resp.diagnostics);
        }
        (None, resp.diagnostics)
    }

    fn resource(&self, type_name: &str) -> Result<&Arc<dyn Resource>, Diagnostics> {
        self.resources.get(type_name).ok_or_else(|| {
            Diagnostics::from_error(
                "Resource Type Not Found",
                format!(
                    "The {type_name} resource type is not supported by provider {}.",
                    self.metadata.type_name
                ),
            )
        })
    }
}

fn schema_of(resource: &Arc<dyn Resource>) -> SchemaResponse {
    let mut resp = SchemaResponse::default();
    resource.schema(&mut resp);
    resp
}

/// Copy of `value` with the named top-level attributes removed
fn without(value: &Value, names: &[&str]) -> Value {
    let mut value = value.clone();
    if let Value::Object(entries) = &mut value {
        for name in names {
            entries.remove(*name);
        }
    }
    value
}

/// Copy of `config` with computed attributes taken from `prior` (or null)
fn with_computed(config: &Value, names: &[&str], prior: Option<&Value>) -> Value {
    let mut value = config.clone();
    if let Value::Object(entries) = &mut value {
        for name in names {
            let computed = prior
                .and_then(|prior| prior.get(*name))
                .cloned()
                .unwrap_or(Value::Null);
            entries.insert((*name).to_string(), computed);
        }
    }
    value
}

/// Removes null object entries, recursively
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}
