//! # L402 Rust Implementation
//!
//! A Rust implementation of the L402 protocol: HTTP-native payment
//! challenges built on the `402 Payment Required` status code.
//!
//! ## Flow
//!
//! 1. A client requests a protected resource and gets a `402` whose body is
//!    a challenge: a set of offers and a payment context token.
//! 2. The client's wallet picks an offer and asks the payment gateway for
//!    payment instructions (`POST /payment-request`).
//! 3. The payment is made out of band. The gateway then sends a completion
//!    notice to the resource server (`POST /payment-success`).
//! 4. The client retries the original request once, and now gets access.
//!
//! ## Quick Start
//!
//! ### Paying a challenge transparently
//!
//! ```rust,no_run
//! use rust_l402::client::L402Client;
//! use rust_l402::wallet::{CheckoutVisitor, FakeWallet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wallet = FakeWallet::new("offer_0001").with_confirmation(CheckoutVisitor::new());
//!     let client = L402Client::new(wallet);
//!
//!     let request = reqwest::Client::new()
//!         .get("http://localhost:8080/private-resource")
//!         .bearer_auth("01badad5-f2f0-43cf-be44-4f8e1c4d8641")
//!         .build()?;
//!
//!     let response = client.execute(request).await?;
//!     println!("{}", response.text().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: Wire messages (challenge, offers, payment request/response)
//! - **`challenge`**: Issuing challenges with fresh payment context tokens
//! - **`gateway`**: Payment request resolution, checkout and completion notices
//! - **`server`**: Resource server paywall and access state (`axum` feature)
//! - **`wallet`**: Wallets paying challenges
//! - **`client`**: HTTP client retrying once after payment
//! - **`logging`**: Tracing setup for the binaries
//! - **`error`**: Error handling
//!
//! ## Optional Features
//!
//! - **`axum`**: HTTP servers for the gateway and the resource server (default)

pub mod challenge;
pub mod client;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod types;
pub mod wallet;

#[cfg(feature = "axum")]
pub mod server;

// Re-exports for convenience
pub use challenge::ChallengeIssuer;
pub use client::L402Client;
pub use error::{L402Error, RequestPhase, Result};
pub use types::*;
pub use wallet::Wallet;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert_eq!(L402_VERSION, "0.2.2");
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_challenge_wire_names() {
        let challenge = ChallengeIssuer::new("http://localhost:8081/payment-request")
            .issue_challenge(vec![Offer::new(
                "offer_0001",
                "Pro",
                OfferType::TopUp,
                10,
                "USD",
            )
            .with_payment_method(PaymentMethod::Lightning)])
            .unwrap();

        let value = serde_json::to_value(&challenge).unwrap();
        assert_eq!(value["version"], L402_VERSION);
        assert_eq!(
            value["payment_request_url"],
            "http://localhost:8081/payment-request"
        );
        assert!(value["offer"].is_array());
        assert_eq!(value["offer"][0]["type"], "top-up");
        assert_eq!(value["offer"][0]["payment_methods"][0], "lightning");
    }

    #[test]
    fn test_payment_methods() {
        assert_eq!(methods::FAKE_PAY, "fake-pay");
        assert_eq!(PaymentMethod::from("fake-pay"), PaymentMethod::FakePay);
        assert_eq!(
            PaymentMethod::from("paypal"),
            PaymentMethod::Other("paypal".to_string())
        );
    }

    #[test]
    fn test_headers() {
        assert_eq!(headers::PAYMENT_CONTEXT, "X-Payment-Context");
        assert_eq!(headers::OFFER_ID, "X-Offer-ID");
    }
}
