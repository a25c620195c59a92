//! Resource server
//!
//! Serves the protected resource. Requests carrying a valid bearer token
//! but no completed payment get a 402 challenge obtained from the payment
//! gateway; completion notices from the gateway flip the per-context access
//! state so the client's retry goes through.
//!
//! # Example
//!
//! ```no_run
//! use rust_l402::server::{create_resource_server_router, PaywallMiddleware, ResourceServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResourceServerConfig::from_env()?;
//! let bind_addr = config.bind_addr.clone();
//! let app = create_resource_server_router(PaywallMiddleware::new(config)?);
//!
//! let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod charge;
pub mod config;
pub mod paywall;
pub mod routes;


pub use access::{AccessStore, InMemoryAccessStore};
pub use charge::ChargeClient;
pub use config::{demo_offers, ResourceServerConfig, DEFAULT_AUTH_TOKEN};
pub use paywall::{paywall_middleware, PaywallMiddleware, PaywallResult};
pub use routes::create_resource_server_router;
