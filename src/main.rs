use anyhow::Result;
use clap::Parser;
use code_cartographer::app::engine::CartographerEngine;
use code_cartographer::cli::{self, Cli, Commands};
use code_cartographer::server::{http, mcp::CartographerMcpServer};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdout carries results and the MCP stream; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let scheme = cli::resolve_scheme(&cli)?;
    let engine = CartographerEngine::load(&cli.input, scheme)?;

    match &cli.command {
        Commands::Query(args) => cli::run_query(&engine, args)?,
        Commands::Diagnostics(args) => cli::display_diagnostics(&engine, args)?,
        Commands::Units => cli::display_units(&engine)?,
        Commands::Serve(args) => {
            let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
            http::serve(engine, addr).await?;
        }
        Commands::Mcp => CartographerMcpServer::new(engine).serve_stdio().await?,
    }

    Ok(())
}
