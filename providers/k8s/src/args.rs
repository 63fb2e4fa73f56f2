use anyhow::{Result, anyhow};
use clap::Parser;
use plugin_framework::ProviderServer;
use std::path::PathBuf;
use std::sync::Arc;
use terraform_provider_k8s::config::{DEFAULT_TYPE_NAME, TYPE_NAME_ENV};
use terraform_provider_k8s::{K8sProvider, ProviderConfig};

#[derive(Clone, Debug, PartialEq, Parser)]
#[command(name = "terraform-provider-k8s", version, about)]
pub struct Args {
    #[command(flatten)]
    pub provider: ProviderArgs,

    #[command(subcommand)]
    pub command: crate::command::Command,
}

impl Args {
    pub(super) async fn execute(self) -> Result<()> {
        let server = self.provider.server()?;
        self.command.execute(&server).await
    }
}

#[derive(Clone, Debug, PartialEq, clap::Args)]
pub struct ProviderArgs {
    /// Prefix of every resource type name
    #[arg(long, env = TYPE_NAME_ENV, default_value = DEFAULT_TYPE_NAME, global = true)]
    pub provider_type_name: String,

    /// Additional CRD file to serve resources for (repeatable)
    #[arg(long = "crd", value_name = "FILE", global = true)]
    pub crd_files: Vec<PathBuf>,
}

impl ProviderArgs {
    fn server(&self) -> Result<ProviderServer> {
        let config = ProviderConfig::new(&self.provider_type_name)?.with_crd_files(self.crd_files.iter().cloned());
        let provider = K8sProvider::from_config(config)?;
        ProviderServer::new(Arc::new(provider)).map_err(|diagnostics| anyhow!("{diagnostics}"))
    }
}
