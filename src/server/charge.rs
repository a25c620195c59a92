//! Client for the gateway's charge endpoint

use crate::gateway::config::join_url;
use crate::types::{paths, ChargeRequest, Offer, PaymentRequiredResponse};
use crate::{L402Error, Result};
use reqwest::Client;
use std::time::Duration;

/// Asks the payment gateway to issue challenges
#[derive(Debug, Clone)]
pub struct ChargeClient {
    /// Charge endpoint of the gateway
    url: String,
    /// HTTP client
    client: Client,
}

impl ChargeClient {
    /// Create a client for the gateway at `gateway_url`
    pub fn new(gateway_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| L402Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: join_url(gateway_url, paths::CHARGE),
            client,
        })
    }

    /// Charge endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request a challenge presenting `offers`
    pub async fn charge(&self, offers: &[Offer]) -> Result<PaymentRequiredResponse> {
        tracing::debug!(num_offers = offers.len(), "sending charge request to gateway");

        let request = ChargeRequest {
            offers: offers.to_vec(),
        };
        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(L402Error::gateway(status.as_u16(), body));
        }

        let challenge: PaymentRequiredResponse = response.json().await?;
        Ok(challenge)
    }
}
