//! HTTP client that pays L402 challenges transparently
//!
//! [`L402Client::execute`] sends a request; if the server answers `402
//! Payment Required`, the challenge in the body is handed to the [`Wallet`]
//! and, after a successful payment, the original request is sent exactly
//! once more. Whatever the retry returns (including another 402) is handed
//! back to the caller.

use crate::error::RequestPhase;
use crate::types::PaymentRequiredResponse;
use crate::wallet::Wallet;
use crate::{L402Error, Result};
use async_trait::async_trait;
use reqwest::{Request, Response, StatusCode};
use std::sync::Arc;

/// Transport used to send requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the response
    async fn send(&self, request: Request) -> std::result::Result<Response, reqwest::Error>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn send(&self, request: Request) -> std::result::Result<Response, reqwest::Error> {
        self.execute(request).await
    }
}

/// Client paying 402 challenges with a wallet and retrying once
#[derive(Clone)]
pub struct L402Client {
    transport: Arc<dyn HttpTransport>,
    wallet: Arc<dyn Wallet>,
}

impl std::fmt::Debug for L402Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L402Client")
            .field("transport", &"<transport>")
            .field("wallet", &"<wallet>")
            .finish()
    }
}

impl L402Client {
    /// Create a client sending requests with a default `reqwest::Client`
    pub fn new(wallet: impl Wallet + 'static) -> Self {
        Self::with_transport(reqwest::Client::new(), wallet)
    }

    /// Create a client with a custom transport
    pub fn with_transport(
        transport: impl HttpTransport + 'static,
        wallet: impl Wallet + 'static,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            wallet: Arc::new(wallet),
        }
    }

    /// Execute a request, paying a 402 challenge if one comes back
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let retry = request.try_clone().ok_or(L402Error::RequestNotReplayable)?;

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| L402Error::transport(RequestPhase::InitialSend, e))?;

        if response.status() != StatusCode::PAYMENT_REQUIRED {
            return Ok(response);
        }

        tracing::info!(url = %retry.url(), "received 402 Payment Required response");

        let challenge = parse_challenge(response).await?;
        tracing::debug!(
            payment_context = %challenge.payment_context_token,
            offer_ids = ?challenge.offer_ids(),
            "parsed payment challenge"
        );

        self.wallet
            .pay(&challenge)
            .await
            .map_err(L402Error::wallet_payment_failed)?;

        tracing::info!(
            payment_context = %challenge.payment_context_token,
            "payment completed, retrying request"
        );

        self.transport
            .send(retry)
            .await
            .map_err(|e| L402Error::transport(RequestPhase::RetrySend, e))
    }
}

/// Parse the body of a 402 response as a challenge
pub async fn parse_challenge(response: Response) -> Result<PaymentRequiredResponse> {
    let body = response
        .bytes()
        .await
        .map_err(|e| L402Error::malformed_challenge(format!("failed to read body: {}", e)))?;

    serde_json::from_slice(&body).map_err(|e| L402Error::malformed_challenge(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport answering with canned responses and counting calls
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<VecDeque<(u16, String)>>,
        calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<(u16, String)>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for Arc<ScriptedTransport> {
        async fn send(&self, _request: Request) -> std::result::Result<Response, reqwest::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request");
            let response = http::Response::builder().status(status).body(body).unwrap();
            Ok(Response::from(response))
        }
    }

    struct CountingWallet {
        succeed: bool,
        calls: AtomicUsize,
    }

    impl CountingWallet {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                succeed,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Wallet for CountingWallet {
        async fn pay(&self, _challenge: &PaymentRequiredResponse) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(L402Error::PaymentDeclined)
            }
        }
    }

    fn challenge_body() -> String {
        json!({
            "version": "0.2.2",
            "payment_request_url": "http://gateway.test/payment-request",
            "payment_context_token": "ctx-1",
            "offer": [{
                "id": "offer_0001",
                "title": "Pro",
                "description": "",
                "type": "top-up",
                "amount": 10,
                "currency": "USD",
                "payment_methods": ["fake-pay"]
            }],
            "terms_url": "https://example.com/terms"
        })
        .to_string()
    }

    fn request() -> Request {
        reqwest::Client::new()
            .get("http://resource.test/private-resource")
            .bearer_auth("token")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_non_402_is_returned_unchanged() {
        let transport = ScriptedTransport::new(vec![(200, "ok".to_string())]);
        let wallet = CountingWallet::new(true);
        let client = L402Client::with_transport(transport.clone(), wallet.clone());

        let response = client.execute(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "ok");
        assert_eq!(transport.calls(), 1);
        assert_eq!(wallet.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_paid_challenge_is_retried_once() {
        let transport = ScriptedTransport::new(vec![
            (402, challenge_body()),
            (200, "granted".to_string()),
        ]);
        let wallet = CountingWallet::new(true);
        let client = L402Client::with_transport(transport.clone(), wallet.clone());

        let response = client.execute(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(transport.calls(), 2);
        assert_eq!(wallet.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_payment_is_not_retried() {
        let transport = ScriptedTransport::new(vec![(402, challenge_body())]);
        let wallet = CountingWallet::new(false);
        let client = L402Client::with_transport(transport.clone(), wallet.clone());

        let err = client.execute(request()).await.unwrap_err();
        assert!(matches!(err, L402Error::WalletPaymentFailed(ref inner)
            if matches!(**inner, L402Error::PaymentDeclined)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_402_is_surfaced() {
        let transport = ScriptedTransport::new(vec![
            (402, challenge_body()),
            (402, challenge_body()),
        ]);
        let wallet = CountingWallet::new(true);
        let client = L402Client::with_transport(transport.clone(), wallet.clone());

        let response = client.execute(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(transport.calls(), 2);
        assert_eq!(wallet.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_challenge() {
        let transport = ScriptedTransport::new(vec![(402, "not json".to_string())]);
        let wallet = CountingWallet::new(true);
        let client = L402Client::with_transport(transport.clone(), wallet.clone());

        let err = client.execute(request()).await.unwrap_err();
        assert!(matches!(err, L402Error::MalformedChallenge(_)));
        assert_eq!(wallet.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initial_send_transport_error() {
        let client = L402Client::new(CountingWallet::new(true));
        let request = reqwest::Client::new()
            .get("http://127.0.0.1:1/private-resource")
            .build()
            .unwrap();

        let err = client.execute(request).await.unwrap_err();
        assert!(matches!(
            err,
            L402Error::Transport {
                phase: RequestPhase::InitialSend,
                ..
            }
        ));
    }
}
