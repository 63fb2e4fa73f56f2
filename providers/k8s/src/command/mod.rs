pub mod destroy;
pub mod render;
pub mod resources;
pub mod schema;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use plugin_framework::{Diagnostics, ProviderServer, Severity};
use serde_json::Value;
use std::path::Path;
use tracing::{error, warn};

#[derive(Clone, Debug, PartialEq, Subcommand)]
pub enum Command {
    /// List the resource type names
    Resources(self::resources::ResourcesArgs),
    /// Print the schema of a resource type as JSON
    Schema(self::schema::SchemaArgs),
    /// Validate, plan and apply a configuration, printing the manifest
    Render(self::render::RenderArgs),
    /// Apply the removal of a stored resource
    Destroy(self::destroy::DestroyArgs),
}

impl Command {
    pub(super) async fn execute(self, server: &ProviderServer) -> Result<()> {
        match self {
            Self::Resources(args) => args.execute(server),
            Self::Schema(args) => args.execute(server),
            Self::Render(args) => args.execute(server).await,
            Self::Destroy(args) => args.execute(server).await,
        }
    }
}

/// Reads a YAML or JSON document
fn read_document(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&source).with_context(|| format!("failed to parse {}", path.display()))
}

/// Logs every diagnostic; fails when any of them is an error
fn report(diagnostics: &Diagnostics) -> Result<()> {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => error!("{diagnostic}"),
            Severity::Warning => warn!("{diagnostic}"),
        }
    }
    if diagnostics.has_error() {
        bail!("{} error(s) reported", diagnostics.errors().count());
    }
    Ok(())
}
