use anyhow::Result;
use clap::Parser;
use plugin_framework::ProviderServer;

#[derive(Clone, Debug, PartialEq, Parser)]
pub struct SchemaArgs {
    /// Resource type name (e.g. k8s_kiali_io_kiali_v1alpha1)
    pub type_name: String,
}

impl SchemaArgs {
    pub(super) fn execute(self, server: &ProviderServer) -> Result<()> {
        let resp = server.resource_schema(&self.type_name);
        super::report(&resp.diagnostics)?;
        println!("{}", serde_json::to_string_pretty(&resp.schema)?);
        Ok(())
    }
}
