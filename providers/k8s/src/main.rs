//! terraform-provider-k8s
//!
//! Drives the k8s provider in-process: list resource types, print schemas,
//! render manifests from configuration files and destroy stored state.
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only the
//! command output.

mod args;
mod command;

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = self::args::Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    debug!("Starting terraform-provider-k8s");

    match args.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
