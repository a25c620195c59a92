//! Resource server configuration

pub use crate::types::DEFAULT_AUTH_TOKEN;

use crate::types::{Offer, OfferType, PaymentMethod};
use crate::{L402Error, Result};
use std::env;
use std::time::Duration;

/// Configuration for the resource server
#[derive(Debug, Clone)]
pub struct ResourceServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    pub bind_addr: String,
    /// Base URL of the payment gateway
    pub gateway_url: String,
    /// Static bearer token clients must present
    pub auth_token: String,
    /// Offers presented in every challenge
    pub offers: Vec<Offer>,
    /// Timeout for calls to the gateway
    pub gateway_timeout: Option<Duration>,
}

impl Default for ResourceServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            gateway_url: "http://localhost:8081".to_string(),
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            offers: demo_offers(),
            gateway_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ResourceServerConfig {
    /// Create a config for the given gateway
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            ..Self::default()
        }
    }

    /// Load the configuration from the environment, falling back to defaults
    ///
    /// Recognized variables: `L402_SERVER_BIND`, `L402_GATEWAY_URL` and
    /// `L402_AUTH_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(bind_addr) = env::var("L402_SERVER_BIND") {
            config.bind_addr = bind_addr;
        }
        if let Ok(gateway_url) = env::var("L402_GATEWAY_URL") {
            config.gateway_url = gateway_url;
        }
        if let Ok(auth_token) = env::var("L402_AUTH_TOKEN") {
            config.auth_token = auth_token;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the bind address
    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    /// Set the bearer token
    pub fn with_auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.auth_token = auth_token.into();
        self
    }

    /// Replace the offers
    pub fn with_offers(mut self, offers: Vec<Offer>) -> Self {
        self.offers = offers;
        self
    }

    /// Validate the resource server configuration
    pub fn validate(&self) -> Result<()> {
        if self.gateway_url.is_empty() {
            return Err(L402Error::config("Gateway URL cannot be empty"));
        }
        if !self.gateway_url.starts_with("http://") && !self.gateway_url.starts_with("https://") {
            return Err(L402Error::config(
                "Gateway URL must start with http:// or https://",
            ));
        }
        if self.auth_token.is_empty() {
            return Err(L402Error::config("Auth token cannot be empty"));
        }
        if self.offers.is_empty() {
            return Err(L402Error::EmptyOffers);
        }
        for offer in &self.offers {
            offer.validate()?;
        }
        Ok(())
    }
}

/// Offers of the demo dataset platform
pub fn demo_offers() -> Vec<Offer> {
    vec![
        Offer::new("offer_0001", "Pro", OfferType::TopUp, 10, "USD")
            .with_description("10 credits for all the datasets in the platform")
            .with_balance(10)
            .with_payment_method(PaymentMethod::Lightning)
            .with_payment_method(PaymentMethod::FakePay),
        Offer::new("offer_0002", "Dataset purchase", OfferType::OneTime, 100, "USD")
            .with_description("Unlimited access to a specific dataset")
            .with_payment_method(PaymentMethod::Lightning)
            .with_payment_method(PaymentMethod::Onchain)
            .with_payment_method(PaymentMethod::FakePay),
        Offer::new("offer_0003", "Unlimited", OfferType::Subscription, 500, "USD")
            .with_description("Unlimited access to all the datasets in the platform")
            .with_payment_method(PaymentMethod::Lightning)
            .with_payment_method(PaymentMethod::Onchain)
            .with_payment_method(PaymentMethod::CreditCard)
            .with_payment_method(PaymentMethod::FakePay),
    ]
}
