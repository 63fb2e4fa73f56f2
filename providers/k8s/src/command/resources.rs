use anyhow::Result;
use clap::Parser;
use plugin_framework::ProviderServer;

#[derive(Clone, Debug, PartialEq, Parser)]
pub struct ResourcesArgs {}

impl ResourcesArgs {
    pub(super) fn execute(self, server: &ProviderServer) -> Result<()> {
        for type_name in server.resource_types() {
            println!("{type_name}");
        }
        Ok(())
    }
}
