//! Sources of the operator's confirmation that a payment was made
//!
//! After a wallet obtains payment instructions the payment itself happens out
//! of band (e.g. visiting a checkout page). A [`PaymentConfirmation`] decides
//! whether the client should go on and retry the original request.

use crate::{L402Error, Result};
use async_trait::async_trait;
use std::io::{self, BufRead, Write};

/// Injectable confirmation source used by wallets before the retry
#[async_trait]
pub trait PaymentConfirmation: Send + Sync {
    /// Return `true` once the payment at `checkout_url` has been made
    async fn confirm(&self, checkout_url: &str) -> Result<bool>;
}

/// Asks the operator on the console
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirmation;

#[async_trait]
impl PaymentConfirmation for StdinConfirmation {
    async fn confirm(&self, _checkout_url: &str) -> Result<bool> {
        let answer = tokio::task::spawn_blocking(|| -> io::Result<String> {
            print!("Simulate the payment (visiting the URL) before continuing? (y/n): ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await
        .map_err(io::Error::other)??;

        Ok(answer.trim() != "n")
    }
}

/// Always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmation(pub bool);

#[async_trait]
impl PaymentConfirmation for FixedConfirmation {
    async fn confirm(&self, _checkout_url: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Makes the payment itself by visiting the checkout URL
#[derive(Debug, Clone, Default)]
pub struct CheckoutVisitor {
    client: reqwest::Client,
}

impl CheckoutVisitor {
    /// Create a visitor with a default HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visitor with the given HTTP client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentConfirmation for CheckoutVisitor {
    async fn confirm(&self, checkout_url: &str) -> Result<bool> {
        tracing::info!(checkout_url = %checkout_url, "visiting checkout page");

        let response = self.client.get(checkout_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(L402Error::gateway(status.as_u16(), body));
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fixed_confirmation() {
        assert!(FixedConfirmation(true).confirm("http://x").await.unwrap());
        assert!(!FixedConfirmation(false).confirm("http://x").await.unwrap());
    }

    #[tokio::test]
    async fn test_checkout_visitor() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/checkout?payment_context_token=t&offer_id=o")
            .with_status(200)
            .with_body("<html>Payment Successful!</html>")
            .create_async()
            .await;

        let url = format!("{}/checkout?payment_context_token=t&offer_id=o", server.url());
        assert!(CheckoutVisitor::new().confirm(&url).await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_checkout_visitor_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/checkout")
            .with_status(410)
            .with_body("expired")
            .create_async()
            .await;

        let url = format!("{}/checkout", server.url());
        assert!(matches!(
            CheckoutVisitor::new().confirm(&url).await,
            Err(L402Error::Gateway { status: 410, .. })
        ));
    }
}
