//! Gateway configuration

use crate::types::{
    paths, DEFAULT_PAYMENT_REQUEST_TTL, DEFAULT_TERMS_URL, MAX_PAYMENT_REQUEST_TTL,
};
use crate::{L402Error, Result};
use std::env;
use std::time::Duration;

/// Configuration for the payment gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address (e.g., "0.0.0.0:8081")
    pub bind_addr: String,
    /// Public base URL of the gateway, used in challenges and checkout links
    pub public_url: String,
    /// Base URL of the resource server receiving completion notices
    pub resource_server_url: String,
    /// How long payment instructions stay valid
    pub payment_request_ttl: Duration,
    /// Reject checkouts whose payment instructions have expired
    pub enforce_expiry: bool,
    /// Terms and conditions URL advertised in challenges
    pub terms_url: String,
    /// Timeout for completion notices sent to the resource server
    pub notify_timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            public_url: "http://localhost:8081".to_string(),
            resource_server_url: "http://localhost:8080".to_string(),
            payment_request_ttl: DEFAULT_PAYMENT_REQUEST_TTL,
            enforce_expiry: false,
            terms_url: DEFAULT_TERMS_URL.to_string(),
            notify_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl GatewayConfig {
    /// Create a config with the given public URL and resource server URL
    pub fn new(public_url: impl Into<String>, resource_server_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
            resource_server_url: resource_server_url.into(),
            ..Self::default()
        }
    }

    /// Load the configuration from the environment, falling back to defaults
    ///
    /// Recognized variables: `L402_GATEWAY_BIND`, `L402_GATEWAY_URL`,
    /// `L402_RESOURCE_SERVER_URL`, `L402_PAYMENT_TTL_SECS`,
    /// `L402_ENFORCE_EXPIRY` and `L402_TERMS_URL`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(bind_addr) = env::var("L402_GATEWAY_BIND") {
            config.bind_addr = bind_addr;
        }
        if let Ok(public_url) = env::var("L402_GATEWAY_URL") {
            config.public_url = public_url;
        }
        if let Ok(resource_server_url) = env::var("L402_RESOURCE_SERVER_URL") {
            config.resource_server_url = resource_server_url;
        }
        if let Ok(ttl) = env::var("L402_PAYMENT_TTL_SECS") {
            let secs: u64 = ttl
                .parse()
                .map_err(|_| L402Error::config(format!("Invalid L402_PAYMENT_TTL_SECS: {}", ttl)))?;
            config.payment_request_ttl = Duration::from_secs(secs);
        }
        if let Ok(enforce) = env::var("L402_ENFORCE_EXPIRY") {
            config.enforce_expiry = parse_flag(&enforce)?;
        }
        if let Ok(terms_url) = env::var("L402_TERMS_URL") {
            config.terms_url = terms_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the bind address
    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    /// Set the payment instruction TTL
    pub fn with_payment_request_ttl(mut self, ttl: Duration) -> Self {
        self.payment_request_ttl = ttl;
        self
    }

    /// Enable or disable expiry enforcement
    pub fn with_enforce_expiry(mut self, enforce_expiry: bool) -> Self {
        self.enforce_expiry = enforce_expiry;
        self
    }

    /// Set the terms URL
    pub fn with_terms_url(mut self, terms_url: impl Into<String>) -> Self {
        self.terms_url = terms_url.into();
        self
    }

    /// Validate the gateway configuration
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("Gateway URL", &self.public_url),
            ("Resource server URL", &self.resource_server_url),
        ] {
            if url.is_empty() {
                return Err(L402Error::config(format!("{} cannot be empty", name)));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(L402Error::config(format!(
                    "{} must start with http:// or https://",
                    name
                )));
            }
        }

        if self.payment_request_ttl.is_zero() {
            return Err(L402Error::config("Payment request TTL must be positive"));
        }
        if self.payment_request_ttl > MAX_PAYMENT_REQUEST_TTL {
            return Err(L402Error::config(format!(
                "Payment request TTL cannot exceed {} seconds",
                MAX_PAYMENT_REQUEST_TTL.as_secs()
            )));
        }

        Ok(())
    }

    /// URL clients post payment requests to
    pub fn payment_request_url(&self) -> String {
        join_url(&self.public_url, paths::PAYMENT_REQUEST)
    }

    /// URL of the simulated checkout page
    pub fn checkout_url(&self) -> String {
        join_url(&self.public_url, paths::CHECKOUT)
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

pub(crate) fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(L402Error::config(format!("Invalid boolean flag: {}", other))),
    }
}
