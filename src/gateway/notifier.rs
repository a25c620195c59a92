//! Payment completion notices
//!
//! Once a payment is confirmed out of band, the gateway tells the resource
//! server that the payment context is paid. The notice carries the payment
//! context token and the offer id as `X-Payment-Context` / `X-Offer-ID`
//! headers. Failures are returned to the caller; there is no retry.

use crate::gateway::config::join_url;
use crate::types::{headers, paths, PaymentCompletion};
use crate::{L402Error, Result};
use reqwest::Client;
use std::time::{Duration, Instant};

/// Sends payment completion notices to a resource server
#[derive(Debug, Clone)]
pub struct PaymentCompletionNotifier {
    /// Webhook URL on the resource server
    url: String,
    /// HTTP client
    client: Client,
}

impl PaymentCompletionNotifier {
    /// Create a notifier for the resource server at `resource_server_url`
    pub fn new(resource_server_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| L402Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: join_url(resource_server_url, paths::PAYMENT_SUCCESS),
            client,
        })
    }

    /// Webhook URL notices are sent to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Notify the resource server that `payment_context_token` is paid
    pub async fn notify_paid(&self, payment_context_token: &str, offer_id: &str) -> Result<()> {
        let completion = PaymentCompletion::new(payment_context_token, offer_id)?;
        self.notify(&completion).await
    }

    /// Send a completion notice
    pub async fn notify(&self, completion: &PaymentCompletion) -> Result<()> {
        let start = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .header(headers::PAYMENT_CONTEXT, &completion.payment_context_token)
            .header(headers::OFFER_ID, &completion.offer_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "failed to notify backend"
                );
                L402Error::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            tracing::error!(
                status_code = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "backend failed to process payment"
            );
            return Err(L402Error::NotificationRejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            payment_context = %completion.payment_context_token,
            offer_id = %completion.offer_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "payment processed successfully"
        );
        Ok(())
    }
}
