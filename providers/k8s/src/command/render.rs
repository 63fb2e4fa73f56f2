use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use plugin_framework::ProviderServer;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The rendered manifest
    #[default]
    Yaml,
    /// The full resource state as JSON
    State,
}

#[derive(Clone, Debug, PartialEq, Parser)]
pub struct RenderArgs {
    /// Resource type name (e.g. k8s_kiali_io_kiali_v1alpha1)
    pub type_name: String,

    /// Resource configuration (YAML or JSON, attribute names)
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Prior state; renders as an update when given
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,

    /// Write the new state to this file
    #[arg(long, value_name = "FILE")]
    pub state_out: Option<PathBuf>,
}

impl RenderArgs {
    #[instrument(skip_all, fields(type_name = %self.type_name))]
    pub(super) async fn execute(self, server: &ProviderServer) -> Result<()> {
        let config = super::read_document(&self.config)?;
        let prior = self.state.as_deref().map(super::read_document).transpose()?;

        super::report(&server.validate_resource_config(&self.type_name, &config).await)?;

        let plan = server.plan_resource_change(&self.type_name, prior.as_ref(), Some(&config));
        super::report(&plan.diagnostics)?;
        info!("Planned {:?}", plan.action);

        let applied = server.apply_resource_change(&self.type_name, prior, Some(config)).await;
        super::report(&applied.diagnostics)?;
        let state = applied
            .new_state
            .ok_or_else(|| anyhow!("{} returned no state", self.type_name))?;

        if let Some(path) = &self.state_out {
            std::fs::write(path, serde_json::to_string_pretty(&state)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote state to {}", path.display());
        }

        match self.output {
            OutputFormat::Yaml => print!("{}", state["yaml"].as_str().unwrap_or_default()),
            OutputFormat::State => println!("{}", serde_json::to_string_pretty(&state)?),
        }
        Ok(())
    }
}
