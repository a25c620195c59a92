//! HTTP routes of the resource server
//!
//! - `GET /private-resource` - the paid resource, behind the paywall
//! - `POST /payment-success` - completion notice from the gateway
//! - `GET /health` - health check

use super::paywall::{paywall_middleware, PaywallMiddleware};
use crate::types::{headers, paths, PaymentCompletion, L402_VERSION};
use crate::Result;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the resource server router
pub fn create_resource_server_router(paywall: PaywallMiddleware) -> Router {
    let protected = Router::new()
        .route(paths::PRIVATE_RESOURCE, get(private_resource_handler))
        .layer(middleware::from_fn_with_state(
            paywall.clone(),
            paywall_middleware,
        ));

    Router::new()
        .merge(protected)
        .route(paths::PAYMENT_SUCCESS, post(payment_success_handler))
        .route(paths::HEALTH, get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(paywall)
}

/// The protected resource
async fn private_resource_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Access granted to dataset 123",
        "status": "success",
    }))
}

/// Completion notice sent by the gateway after a payment
async fn payment_success_handler(
    State(paywall): State<PaywallMiddleware>,
    request_headers: HeaderMap,
) -> Result<StatusCode> {
    let header = |name: &str| {
        request_headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    let completion = PaymentCompletion::new(
        header(headers::PAYMENT_CONTEXT),
        header(headers::OFFER_ID),
    )
    .map_err(|e| {
        tracing::warn!("completion notice without correlation headers");
        e
    })?;

    let transitioned = paywall
        .access()
        .mark_paid(&completion.payment_context_token, &completion.offer_id)
        .await?;

    if transitioned {
        tracing::info!(
            payment_context = %completion.payment_context_token,
            offer_id = %completion.offer_id,
            "payment completed"
        );
    } else {
        tracing::debug!(
            payment_context = %completion.payment_context_token,
            "duplicate completion notice"
        );
    }

    Ok(StatusCode::OK)
}

/// Health check endpoint
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "role": "resource-server",
        "version": crate::VERSION,
        "l402_version": L402_VERSION,
    }))
}
