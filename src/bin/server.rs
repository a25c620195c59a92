//! L402 Resource Server
//!
//! Serves `/private-resource` behind an L402 paywall.

use clap::Parser;
use rust_l402::logging::{init_tracing, LogFormat};
use rust_l402::server::{create_resource_server_router, PaywallMiddleware, ResourceServerConfig};

/// L402 protected resource server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Log output format
    #[arg(long, value_enum, env = "L402_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = ResourceServerConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let gateway_url = config.gateway_url.clone();
    let app = create_resource_server_router(PaywallMiddleware::new(config)?);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        bind_addr = %bind_addr,
        gateway_url = %gateway_url,
        "L402 resource server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
