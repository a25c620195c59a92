//! Paywall middleware for protected routes

use super::access::{AccessStore, InMemoryAccessStore};
use super::charge::ChargeClient;
use super::config::ResourceServerConfig;
use crate::Result;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Axum middleware gating routes behind an L402 payment
#[derive(Clone)]
pub struct PaywallMiddleware {
    pub config: Arc<ResourceServerConfig>,
    pub charge: ChargeClient,
    pub access: Arc<dyn AccessStore>,
}

impl std::fmt::Debug for PaywallMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaywallMiddleware")
            .field("config", &self.config)
            .field("charge", &self.charge)
            .field("access", &"<access store>")
            .finish()
    }
}

/// Outcome of checking a request against the paywall
#[derive(Debug)]
pub enum PaywallResult {
    /// The subject has paid, the request reaches the handler
    Granted { subject: String },
    /// 402 with a fresh challenge bound to the subject
    PaymentRequired { response: Response },
    /// Missing or unknown bearer token
    Unauthorized { response: Response },
}

impl PaywallMiddleware {
    /// Create a paywall from a configuration, with an in-memory access store
    pub fn new(config: ResourceServerConfig) -> Result<Self> {
        config.validate()?;
        let charge = ChargeClient::new(&config.gateway_url, config.gateway_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            charge,
            access: Arc::new(InMemoryAccessStore::new()),
        })
    }

    /// Use a different access store
    pub fn with_access_store(mut self, access: Arc<dyn AccessStore>) -> Self {
        self.access = access;
        self
    }

    /// Get the paywall configuration
    pub fn config(&self) -> &ResourceServerConfig {
        &self.config
    }

    /// Get the access store
    pub fn access(&self) -> &Arc<dyn AccessStore> {
        &self.access
    }

    /// Check the request headers against the paywall
    pub async fn process(&self, headers: &HeaderMap) -> Result<PaywallResult> {
        let subject = match bearer_token(headers) {
            Some(token) => token,
            None => {
                tracing::warn!("request without bearer token");
                return Ok(PaywallResult::Unauthorized {
                    response: unauthorized("Unauthorized: missing bearer token"),
                });
            }
        };

        if subject != self.config.auth_token {
            tracing::warn!("request with unknown bearer token");
            return Ok(PaywallResult::Unauthorized {
                response: unauthorized("Unauthorized: invalid token"),
            });
        }

        if self.access.has_access(subject).await? {
            return Ok(PaywallResult::Granted {
                subject: subject.to_string(),
            });
        }

        let challenge = self.charge.charge(&self.config.offers).await.map_err(|e| {
            tracing::error!(error = %e, "failed to obtain a challenge from the gateway");
            e
        })?;
        self.access
            .bind(&challenge.payment_context_token, subject)
            .await?;

        tracing::info!(
            payment_context = %challenge.payment_context_token,
            offer_ids = ?challenge.offer_ids(),
            "payment required"
        );

        Ok(PaywallResult::PaymentRequired {
            response: (StatusCode::PAYMENT_REQUIRED, Json(challenge)).into_response(),
        })
    }
}

/// Axum middleware function for the paywall
pub async fn paywall_middleware(
    State(paywall): State<PaywallMiddleware>,
    request: Request,
    next: Next,
) -> Result<Response> {
    match paywall.process(request.headers()).await? {
        PaywallResult::Granted { .. } => Ok(next.run(request).await),
        PaywallResult::PaymentRequired { response } => Ok(response),
        PaywallResult::Unauthorized { response } => Ok(response),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized(message: &'static str) -> Response {
    (StatusCode::UNAUTHORIZED, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_process_rejects_unknown_token() {
        let paywall = PaywallMiddleware::new(ResourceServerConfig::default()).unwrap();
        let result = paywall.process(&headers_with("Bearer nope")).await.unwrap();
        assert!(matches!(result, PaywallResult::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_process_grants_paid_subject() {
        let config = ResourceServerConfig::default();
        let token = config.auth_token.clone();
        let paywall = PaywallMiddleware::new(config).unwrap();

        paywall.access.bind("ctx", &token).await.unwrap();
        paywall.access.mark_paid("ctx", "offer_0001").await.unwrap();

        let result = paywall
            .process(&headers_with(&format!("Bearer {}", token)))
            .await
            .unwrap();
        assert!(matches!(result, PaywallResult::Granted { subject } if subject == token));
    }
}
