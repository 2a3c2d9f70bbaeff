//! This is a command-line tool for browsing the food map through the
//! `foodweb` HTTP API
use crate::{cli::Cli, client::LocationClient};
use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::filter::EnvFilter;

mod cli;
mod client;
mod commands;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("FOODCTL_LOG"))
        .with_writer(std::io::stderr)
        .init();
    let args = Cli::parse();
    debug!(server = %args.server, "using server");
    let mut client = LocationClient::new(args.server);
    commands::locations::handle_command(args.command, &mut client).await
}
