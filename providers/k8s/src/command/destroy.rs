use anyhow::Result;
use clap::Parser;
use plugin_framework::ProviderServer;
use std::path::PathBuf;
use tracing::{info, instrument};

#[derive(Clone, Debug, PartialEq, Parser)]
pub struct DestroyArgs {
    /// Resource type name (e.g. k8s_kiali_io_kiali_v1alpha1)
    pub type_name: String,

    /// Stored state of the resource
    #[arg(long, value_name = "FILE")]
    pub state: PathBuf,
}

impl DestroyArgs {
    #[instrument(skip_all, fields(type_name = %self.type_name))]
    pub(super) async fn execute(self, server: &ProviderServer) -> Result<()> {
        let prior = super::read_document(&self.state)?;
        let applied = server.apply_resource_change(&self.type_name, Some(prior), None).await;
        super::report(&applied.diagnostics)?;
        info!("Destroyed; state removed");
        Ok(())
    }
}
