//! L402 Client
//!
//! Requests the protected resource and pays the challenge if one comes back.

use clap::Parser;
use rust_l402::client::L402Client;
use rust_l402::logging::{init_tracing, LogFormat};
use rust_l402::types::DEFAULT_AUTH_TOKEN;
use rust_l402::wallet::{CheckoutVisitor, FakeWallet, InspectWallet};

/// L402 demo client
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Offer ID that we will purchase
    #[arg(long, default_value = "offer_0001")]
    offer_id: String,

    /// Simulate a fake payment
    #[arg(long)]
    fake: bool,

    /// Visit the checkout page instead of asking for confirmation
    #[arg(long, requires = "fake")]
    auto_pay: bool,

    /// Protected resource URL
    #[arg(long, default_value = "http://localhost:8080/private-resource")]
    url: String,

    /// Bearer token
    #[arg(long, env = "L402_AUTH_TOKEN", default_value = DEFAULT_AUTH_TOKEN)]
    token: String,

    /// Log output format
    #[arg(long, value_enum, env = "L402_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let client = if args.fake {
        let wallet = FakeWallet::new(&args.offer_id);
        if args.auto_pay {
            L402Client::new(wallet.with_confirmation(CheckoutVisitor::new()))
        } else {
            L402Client::new(wallet)
        }
    } else {
        L402Client::new(InspectWallet::new())
    };

    let request = reqwest::Client::new()
        .get(&args.url)
        .bearer_auth(&args.token)
        .build()?;

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, url = %args.url, "failed to execute request");
            std::process::exit(1);
        }
    };

    let status = response.status();
    let body = response.text().await?;
    tracing::info!(
        status = status.as_u16(),
        url = %args.url,
        offer_id = %args.offer_id,
        "request completed"
    );
    println!("{}", body);

    Ok(())
}
