//! L402 Payment Gateway
//!
//! Issues challenges for resource servers, resolves payment requests and
//! simulates the out-of-band checkout.

use clap::Parser;
use rust_l402::gateway::{create_gateway_router, GatewayConfig, GatewayState};
use rust_l402::logging::{init_tracing, LogFormat};

/// L402 payment gateway
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

    let config = GatewayConfig::from_env()?;
    let app = create_gateway_router(GatewayState::from_config(&config)?);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        public_url = %config.public_url,
        resource_server_url = %config.resource_server_url,
        enforce_expiry = config.enforce_expiry,
        "L402 gateway listening"
    );
    println!("Available endpoints:");
    println!("   POST /charge - Issue a payment challenge");
    println!("   POST /payment-request - Get payment instructions for an offer");
    println!("   GET /checkout - Simulated checkout page");
    println!("   GET /health - Health check endpoint");

    axum::serve(listener, app).await?;

    Ok(())
}
