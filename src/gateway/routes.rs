//! HTTP routes of the payment gateway
//!
//! - `POST /charge` - issue a challenge for the posted offers
//! - `POST /payment-request` - payment instructions for an offer of a challenge
//! - `GET /checkout` - simulated out-of-band payment, triggers the completion notice
//! - `GET /health` - health check

use super::config::GatewayConfig;
use super::ledger::{ChallengeLedger, InMemoryLedger};
use super::notifier::PaymentCompletionNotifier;
use super::resolver::{FakePayHandler, PaymentRequestResolver};
use crate::challenge::ChallengeIssuer;
use crate::types::{
    paths, ChargeRequest, PaymentRequestRequest, PaymentRequestResponse,
    PaymentRequiredResponse, L402_VERSION,
};
use crate::{L402Error, Result};
use axum::{
    extract::{Query, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state of the gateway routes
#[derive(Clone)]
pub struct GatewayState {
    issuer: ChallengeIssuer,
    resolver: PaymentRequestResolver,
    notifier: PaymentCompletionNotifier,
    ledger: Arc<dyn ChallengeLedger>,
    enforce_expiry: bool,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("issuer", &self.issuer)
            .field("resolver", &self.resolver)
            .field("notifier", &self.notifier)
            .field("ledger", &"<ledger>")
            .field("enforce_expiry", &self.enforce_expiry)
            .finish()
    }
}

impl GatewayState {
    /// Create gateway state from its collaborators, with an in-memory ledger
    pub fn new(
        issuer: ChallengeIssuer,
        resolver: PaymentRequestResolver,
        notifier: PaymentCompletionNotifier,
    ) -> Self {
        Self {
            issuer,
            resolver,
            notifier,
            ledger: Arc::new(InMemoryLedger::new()),
            enforce_expiry: false,
        }
    }

    /// Build the demo gateway: fake-pay checkout, in-memory ledger
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;

        let issuer =
            ChallengeIssuer::new(config.payment_request_url()).with_terms_url(&config.terms_url);
        let resolver = PaymentRequestResolver::new()
            .with_handler(FakePayHandler::new(&config.checkout_url())?)
            .with_ttl(config.payment_request_ttl);
        let notifier =
            PaymentCompletionNotifier::new(&config.resource_server_url, config.notify_timeout)?;

        Ok(Self::new(issuer, resolver, notifier).with_enforce_expiry(config.enforce_expiry))
    }

    /// Use a different challenge ledger
    pub fn with_ledger(mut self, ledger: impl ChallengeLedger + 'static) -> Self {
        self.ledger = Arc::new(ledger);
        self
    }

    /// Enable or disable expiry enforcement at checkout
    pub fn with_enforce_expiry(mut self, enforce_expiry: bool) -> Self {
        self.enforce_expiry = enforce_expiry;
        self
    }
}

/// Create the gateway router
pub fn create_gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route(paths::CHARGE, post(charge_handler))
        .route(paths::PAYMENT_REQUEST, post(payment_request_handler))
        .route(paths::CHECKOUT, get(checkout_handler))
        .route(paths::HEALTH, get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Issue a challenge for the offers of a resource server
async fn charge_handler(
    State(state): State<GatewayState>,
    Json(request): Json<ChargeRequest>,
) -> Result<Json<PaymentRequiredResponse>> {
    if request.offers.is_empty() {
        tracing::warn!("no offers in charge request");
        return Err(L402Error::EmptyOffers);
    }

    let offer_ids: Vec<&str> = request.offers.iter().map(|o| o.id.as_str()).collect();
    tracing::info!(
        num_offers = request.offers.len(),
        offer_ids = ?offer_ids,
        "received charge request"
    );

    let challenge = state.issuer.issue_challenge(request.offers)?;
    state.ledger.record(&challenge).await?;

    tracing::info!(
        payment_context = %challenge.payment_context_token,
        "charge request processed"
    );
    Ok(Json(challenge))
}

/// Turn a chosen offer and method into payment instructions
async fn payment_request_handler(
    State(state): State<GatewayState>,
    Json(request): Json<PaymentRequestRequest>,
) -> Result<Json<PaymentRequestResponse>> {
    tracing::info!(
        offer_id = %request.offer_id,
        payment_method = %request.payment_method,
        payment_context = %request.payment_context_token,
        "received payment request"
    );

    if request.payment_context_token.is_empty() {
        return Err(L402Error::MissingCorrelation);
    }

    let offers = state
        .ledger
        .offers(&request.payment_context_token)
        .await?
        .ok_or_else(|| L402Error::UnknownPaymentContext(request.payment_context_token.clone()))?;

    let response = state.resolver.resolve(&request, &offers).map_err(|e| {
        tracing::warn!(
            error = %e,
            payment_method = %request.payment_method,
            offer_id = %request.offer_id,
            "payment request rejected"
        );
        e
    })?;

    state
        .ledger
        .record_payment_request(
            &request.payment_context_token,
            &request.offer_id,
            response.expires_at()?,
        )
        .await?;

    Ok(Json(response))
}

/// Query parameters of the checkout page
#[derive(Debug, Deserialize)]
struct CheckoutParams {
    #[serde(default)]
    payment_context_token: String,
    #[serde(default)]
    offer_id: String,
}

/// Simulated out-of-band payment
///
/// The checkout link carries its expiry for display only; the expiry that is
/// enforced is the one recorded when the instructions were issued.
async fn checkout_handler(
    State(state): State<GatewayState>,
    Query(params): Query<CheckoutParams>,
) -> Result<Html<String>> {
    tracing::info!(
        payment_context = %params.payment_context_token,
        offer_id = %params.offer_id,
        "received checkout request"
    );

    if params.payment_context_token.is_empty() || params.offer_id.is_empty() {
        tracing::warn!(
            payment_context = %params.payment_context_token,
            offer_id = %params.offer_id,
            "missing parameters in checkout request"
        );
        return Err(L402Error::MissingCorrelation);
    }

    let offers = state
        .ledger
        .offers(&params.payment_context_token)
        .await?
        .ok_or_else(|| {
            tracing::warn!(
                payment_context = %params.payment_context_token,
                "checkout for unknown payment context"
            );
            L402Error::UnknownPaymentContext(params.payment_context_token.clone())
        })?;

    if !offers.iter().any(|offer| offer.id == params.offer_id) {
        tracing::warn!(
            payment_context = %params.payment_context_token,
            offer_id = %params.offer_id,
            "checkout for offer outside the challenge"
        );
        return Err(L402Error::offer_not_found(&params.offer_id));
    }

    if state.enforce_expiry {
        // Without issued instructions there is no expiry to honor
        let expires_at = state
            .ledger
            .payment_request_expiry(&params.payment_context_token, &params.offer_id)
            .await?
            .ok_or_else(|| L402Error::PaymentRequestExpired("unknown".to_string()))?;
        if expires_at <= Utc::now() {
            tracing::warn!(
                payment_context = %params.payment_context_token,
                expires_at = %expires_at,
                "checkout after expiry"
            );
            return Err(L402Error::PaymentRequestExpired(
                expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
    }

    state
        .notifier
        .notify_paid(&params.payment_context_token, &params.offer_id)
        .await?;

    Ok(Html(format!(
        r#"<html>
    <body style="font-family: Arial, sans-serif; max-width: 600px; margin: 40px auto; text-align: center;">
        <h1 style="color: #4CAF50;">Payment Successful!</h1>
        <p>Your payment for offer {} has been processed.</p>
        <p>You can now return to the application and access your content.</p>
    </body>
</html>"#,
        escape_html(&params.offer_id)
    )))
}

/// Health check endpoint
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "role": "gateway",
        "version": crate::VERSION,
        "l402_version": L402_VERSION,
    }))
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
