//! Wallet that simulates payments through the gateway checkout

use super::confirm::{PaymentConfirmation, StdinConfirmation};
use super::Wallet;
use crate::types::{
    PaymentMethod, PaymentRequestRequest, PaymentRequestResponse, PaymentRequiredResponse,
};
use crate::{L402Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Wallet paying a fixed offer with a simulated payment method
///
/// Paying means obtaining payment instructions from the gateway and having
/// the [`PaymentConfirmation`] source confirm the out-of-band payment. The
/// access grant itself reaches the resource server through the gateway.
#[derive(Clone)]
pub struct FakeWallet {
    offer_id: String,
    payment_method: PaymentMethod,
    client: reqwest::Client,
    confirmation: Arc<dyn PaymentConfirmation>,
    enforce_expiry: bool,
}

impl std::fmt::Debug for FakeWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeWallet")
            .field("offer_id", &self.offer_id)
            .field("payment_method", &self.payment_method)
            .field("enforce_expiry", &self.enforce_expiry)
            .finish()
    }
}

impl FakeWallet {
    /// Create a wallet for `offer_id` that asks on the console before retrying
    pub fn new(offer_id: impl Into<String>) -> Self {
        Self {
            offer_id: offer_id.into(),
            payment_method: PaymentMethod::FakePay,
            client: reqwest::Client::new(),
            confirmation: Arc::new(StdinConfirmation),
            enforce_expiry: false,
        }
    }

    /// Pay with a different method
    pub fn with_payment_method(mut self, payment_method: impl Into<PaymentMethod>) -> Self {
        self.payment_method = payment_method.into();
        self
    }

    /// Use a different confirmation source
    pub fn with_confirmation(mut self, confirmation: impl PaymentConfirmation + 'static) -> Self {
        self.confirmation = Arc::new(confirmation);
        self
    }

    /// Use a different HTTP client for the payment request
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Refuse payment instructions past their expiry
    pub fn with_enforce_expiry(mut self, enforce_expiry: bool) -> Self {
        self.enforce_expiry = enforce_expiry;
        self
    }

    /// Offer this wallet pays for
    pub fn offer_id(&self) -> &str {
        &self.offer_id
    }

    /// Obtain payment instructions for the configured offer
    pub async fn request_payment(
        &self,
        challenge: &PaymentRequiredResponse,
    ) -> Result<PaymentRequestResponse> {
        let offer = challenge
            .find_offer(&self.offer_id)
            .ok_or_else(|| L402Error::offer_not_found(&self.offer_id))?;

        if !offer.supports(&self.payment_method) {
            return Err(L402Error::unsupported_payment_method(
                self.payment_method.as_str(),
                &offer.id,
            ));
        }

        tracing::info!(
            offer_id = %offer.id,
            title = %offer.title,
            amount = offer.amount,
            currency = %offer.currency,
            "processing payment"
        );

        let request = PaymentRequestRequest::new(
            &offer.id,
            self.payment_method.clone(),
            &challenge.payment_context_token,
        );
        let response = self
            .client
            .post(&challenge.payment_request_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(L402Error::gateway(status.as_u16(), body));
        }

        let payment: PaymentRequestResponse = response.json().await?;
        tracing::info!(
            checkout_url = %payment.payment_request.checkout_url,
            expires_at = %payment.expires_at,
            "received payment request response"
        );

        if self.enforce_expiry && payment.is_expired_at(Utc::now())? {
            return Err(L402Error::PaymentRequestExpired(payment.expires_at.clone()));
        }

        Ok(payment)
    }
}

#[async_trait]
impl Wallet for FakeWallet {
    async fn pay(&self, challenge: &PaymentRequiredResponse) -> Result<()> {
        let payment = self.request_payment(challenge).await?;
        let checkout_url = &payment.payment_request.checkout_url;

        println!("\nTo complete the payment, visit:\n{}\n", checkout_url);

        if !self.confirmation.confirm(checkout_url).await? {
            return Err(L402Error::PaymentDeclined);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Offer, OfferType};
    use crate::wallet::FixedConfirmation;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn challenge(payment_request_url: String) -> PaymentRequiredResponse {
        PaymentRequiredResponse {
            version: "0.2.2".to_string(),
            payment_request_url,
            payment_context_token: "ctx-1".to_string(),
            offers: vec![
                Offer::new("offer_0001", "Pro", OfferType::TopUp, 10, "USD")
                    .with_payment_method(PaymentMethod::FakePay),
                Offer::new("offer_0002", "Dataset purchase", OfferType::OneTime, 100, "USD")
                    .with_payment_method(PaymentMethod::Lightning),
            ],
            terms_url: "https://example.com/terms".to_string(),
        }
    }

    fn payment_body(expires_at: &str) -> String {
        json!({
            "version": "0.2.2",
            "expires_at": expires_at,
            "payment_request": {
                "check_url": "http://gateway.test/checkout?payment_context_token=ctx-1&offer_id=offer_0001"
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_pay_requests_instructions() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/payment-request")
            .match_body(Matcher::PartialJson(json!({
                "offer_id": "offer_0001",
                "payment_method": "fake-pay",
                "payment_context_token": "ctx-1"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(payment_body("2999-01-01T00:00:00Z"))
            .create_async()
            .await;

        let wallet = FakeWallet::new("offer_0001").with_confirmation(FixedConfirmation(true));
        wallet
            .pay(&challenge(format!("{}/payment-request", server.url())))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_pay_unknown_offer() {
        let wallet = FakeWallet::new("offer_9999").with_confirmation(FixedConfirmation(true));
        let result = wallet
            .pay(&challenge("http://gateway.test/payment-request".to_string()))
            .await;
        assert!(matches!(result, Err(L402Error::OfferNotFound(id)) if id == "offer_9999"));
    }

    #[tokio::test]
    async fn test_pay_unsupported_method() {
        let wallet = FakeWallet::new("offer_0002").with_confirmation(FixedConfirmation(true));
        let result = wallet
            .pay(&challenge("http://gateway.test/payment-request".to_string()))
            .await;
        assert!(matches!(
            result,
            Err(L402Error::UnsupportedPaymentMethod { .. })
        ));
    }

    #[tokio::test]
    async fn test_pay_gateway_rejects() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/payment-request")
            .with_status(400)
            .with_body("Unknown payment context: ctx-1")
            .create_async()
            .await;

        let wallet = FakeWallet::new("offer_0001").with_confirmation(FixedConfirmation(true));
        let result = wallet
            .pay(&challenge(format!("{}/payment-request", server.url())))
            .await;
        assert!(matches!(result, Err(L402Error::Gateway { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_pay_declined() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/payment-request")
            .with_status(200)
            .with_body(payment_body("2999-01-01T00:00:00Z"))
            .create_async()
            .await;

        let wallet = FakeWallet::new("offer_0001").with_confirmation(FixedConfirmation(false));
        let result = wallet
            .pay(&challenge(format!("{}/payment-request", server.url())))
            .await;
        assert!(matches!(result, Err(L402Error::PaymentDeclined)));
    }

    #[tokio::test]
    async fn test_expired_instructions() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/payment-request")
            .with_status(200)
            .with_body(payment_body("2020-01-01T00:00:00Z"))
            .expect(2)
            .create_async()
            .await;
        let challenge = challenge(format!("{}/payment-request", server.url()));

        // advisory by default
        let wallet = FakeWallet::new("offer_0001").with_confirmation(FixedConfirmation(true));
        assert!(wallet.pay(&challenge).await.is_ok());

        let wallet = wallet.with_enforce_expiry(true);
        assert!(matches!(
            wallet.pay(&challenge).await,
            Err(L402Error::PaymentRequestExpired(_))
        ));
    }
}
