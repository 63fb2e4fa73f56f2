//! Plugin Framework
//!
//! The resource lifecycle surface a Terraform-style provider implements:
//! schema declaration, diagnostics, configuration/state access and the
//! Metadata/Schema/Validate/Create/Read/Update/Delete handlers.
//!
//! Providers implement [`Provider`] and [`Resource`]; the [`ProviderServer`]
//! drives them the way Terraform core does (validate, plan, apply, read).
//!
//! # Example
//!
//! ```no_run
//! use plugin_framework::{ProviderServer, Provider};
//! use std::sync::Arc;
//!
//! # async fn example(provider: Arc<dyn Provider>) -> Result<(), Box<dyn std::error::Error>> {
//! let server = ProviderServer::new(provider).map_err(|d| d.to_string())?;
//! let config = serde_json::json!({ "metadata": { "name": "example" } });
//! let diagnostics = server.validate_resource_config("k8s_example_v1", &config).await;
//! if !diagnostics.has_error() {
//!     let applied = server
//!         .apply_resource_change("k8s_example_v1", None, Some(config))
//!         .await;
//!     println!("{:?}", applied.new_state);
//! }
//! # Ok(())
//! # }
//! ```

pub mod coerce;
pub mod diagnostics;
pub mod path;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod server;
pub mod state;
pub mod validator;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use path::{AttributePath, PathStep};
pub use provider::*;
pub use resource::*;
pub use schema::{Attribute, AttributeType, Schema};
pub use server::{ApplyResponse, PlanResponse, PlannedAction, ProviderServer};
pub use state::{Config, State};
pub use validator::{AttributeValidator, Validator};
