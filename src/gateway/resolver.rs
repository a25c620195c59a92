//! Payment request resolution
//!
//! The resolver validates that the client picked an offer of its challenge
//! and a payment method that offer supports, then asks the handler
//! registered for that method to produce the payment instructions. New
//! payment rails are added by implementing [`PaymentMethodHandler`].

use crate::types::{
    Offer, PayReq, PaymentMethod, PaymentRequestRequest, PaymentRequestResponse,
    DEFAULT_PAYMENT_REQUEST_TTL,
};
use crate::{L402Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Produces method-specific payment instructions
pub trait PaymentMethodHandler: Send + Sync {
    /// Payment method served by this handler
    fn method(&self) -> PaymentMethod;

    /// Build the instructions for paying `offer` under the request's context
    fn payment_request(
        &self,
        request: &PaymentRequestRequest,
        offer: &Offer,
        expires_at: DateTime<Utc>,
    ) -> Result<PayReq>;
}

/// Handler for the simulated `fake-pay` method
///
/// The instructions are a checkout URL on the gateway; visiting it completes
/// the payment.
#[derive(Debug, Clone)]
pub struct FakePayHandler {
    checkout_url: Url,
}

impl FakePayHandler {
    /// Create a handler pointing at the gateway's checkout page
    pub fn new(checkout_url: &str) -> Result<Self> {
        Ok(Self {
            checkout_url: Url::parse(checkout_url)?,
        })
    }
}

impl PaymentMethodHandler for FakePayHandler {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::FakePay
    }

    fn payment_request(
        &self,
        request: &PaymentRequestRequest,
        offer: &Offer,
        expires_at: DateTime<Utc>,
    ) -> Result<PayReq> {
        let mut checkout_url = self.checkout_url.clone();
        checkout_url
            .query_pairs_mut()
            .append_pair("payment_context_token", &request.payment_context_token)
            .append_pair("offer_id", &offer.id)
            .append_pair(
                "expires_at",
                &expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            );

        Ok(PayReq::checkout(checkout_url))
    }
}

/// Resolves payment requests into payment instructions
#[derive(Clone)]
pub struct PaymentRequestResolver {
    handlers: HashMap<PaymentMethod, Arc<dyn PaymentMethodHandler>>,
    ttl: Duration,
}

impl std::fmt::Debug for PaymentRequestResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&str> = self.handlers.keys().map(PaymentMethod::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("PaymentRequestResolver")
            .field("methods", &methods)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Default for PaymentRequestResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentRequestResolver {
    /// Create a resolver without any handler
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            ttl: DEFAULT_PAYMENT_REQUEST_TTL,
        }
    }

    /// Register a handler, replacing any handler for the same method
    pub fn with_handler(mut self, handler: impl PaymentMethodHandler + 'static) -> Self {
        self.handlers.insert(handler.method(), Arc::new(handler));
        self
    }

    /// Set how long issued instructions stay valid
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Methods this resolver can produce instructions for
    pub fn supports(&self, method: &PaymentMethod) -> bool {
        self.handlers.contains_key(method)
    }

    /// Resolve a payment request against the offers of its challenge
    pub fn resolve(
        &self,
        request: &PaymentRequestRequest,
        offers: &[Offer],
    ) -> Result<PaymentRequestResponse> {
        self.resolve_at(request, offers, Utc::now())
    }

    /// Resolve a payment request as of `now`
    pub fn resolve_at(
        &self,
        request: &PaymentRequestRequest,
        offers: &[Offer],
        now: DateTime<Utc>,
    ) -> Result<PaymentRequestResponse> {
        if request.payment_context_token.is_empty() {
            return Err(L402Error::MissingCorrelation);
        }

        let offer = offers
            .iter()
            .find(|offer| offer.id == request.offer_id)
            .ok_or_else(|| L402Error::offer_not_found(&request.offer_id))?;

        if !offer.supports(&request.payment_method) {
            return Err(L402Error::unsupported_payment_method(
                request.payment_method.as_str(),
                &offer.id,
            ));
        }

        let handler = self.handlers.get(&request.payment_method).ok_or_else(|| {
            L402Error::unsupported_payment_method(request.payment_method.as_str(), &offer.id)
        })?;

        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| L402Error::config(format!("Invalid payment request TTL: {}", e)))?;
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            L402Error::config(format!(
                "Payment request TTL of {}s overflows the expiry timestamp",
                self.ttl.as_secs()
            ))
        })?;
        let payment_request = handler.payment_request(request, offer, expires_at)?;

        tracing::info!(
            offer_id = %offer.id,
            payment_method = %request.payment_method,
            payment_context = %request.payment_context_token,
            expires_at = %expires_at,
            "payment request processed"
        );

        Ok(PaymentRequestResponse::new(expires_at, payment_request))
    }
}
