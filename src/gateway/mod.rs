//! Payment gateway
//!
//! The gateway is the authority on payments. It issues challenges on behalf
//! of resource servers, turns a chosen offer and payment method into payment
//! instructions, and notifies the resource server once a payment completes.
//!
//! # Architecture
//!
//! The gateway module is organized as follows:
//! - [`resolver`] - [`PaymentRequestResolver`] and the pluggable [`PaymentMethodHandler`]s
//! - [`notifier`] - [`PaymentCompletionNotifier`] sending completion notices
//! - [`ledger`] - Record of issued challenges (payment context token to offers)
//! - [`config`] - [`GatewayConfig`]
//! - `routes` - axum routes (requires the `axum` feature)
//!
//! # Examples
//!
//! ## Resolving a Payment Request
//!
//! ```
//! use rust_l402::gateway::{FakePayHandler, PaymentRequestResolver};
//! use rust_l402::types::{Offer, OfferType, PaymentMethod, PaymentRequestRequest};
//!
//! # fn example() -> rust_l402::Result<()> {
//! let resolver = PaymentRequestResolver::new()
//!     .with_handler(FakePayHandler::new("http://localhost:8081/checkout")?);
//!
//! let offers = vec![Offer::new("offer_0001", "Pro", OfferType::TopUp, 10, "USD")
//!     .with_payment_method(PaymentMethod::FakePay)];
//! let request = PaymentRequestRequest::new("offer_0001", PaymentMethod::FakePay, "token");
//!
//! let response = resolver.resolve(&request, &offers)?;
//! assert!(!response.payment_request.checkout_url.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Running the Gateway
//!
//! ```no_run
//! use rust_l402::gateway::{create_gateway_router, GatewayConfig, GatewayState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let app = create_gateway_router(GatewayState::from_config(&config)?);
//!
//! let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ledger;
pub mod notifier;
pub mod resolver;

#[cfg(feature = "axum")]
pub mod routes;


// Re-export commonly used types
pub use config::GatewayConfig;
pub use ledger::{ChallengeLedger, InMemoryLedger};
pub use notifier::PaymentCompletionNotifier;
pub use resolver::{FakePayHandler, PaymentMethodHandler, PaymentRequestResolver};

#[cfg(feature = "axum")]
pub use routes::{create_gateway_router, GatewayState};
