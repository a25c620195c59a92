//! Error types for the L402 implementation
//!
//! Every fallible operation in the crate returns [`Result`], whose error type
//! [`L402Error`] names the protocol phase that failed. Errors are always
//! surfaced to the immediate caller; nothing in the crate retries on error.

use std::fmt;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, L402Error>;

/// Phase of a transparent-retry request cycle in which a transport error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// The original outbound request
    InitialSend,
    /// The single retry after a successful payment
    RetrySend,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestPhase::InitialSend => write!(f, "initial send"),
            RequestPhase::RetrySend => write!(f, "retry send"),
        }
    }
}

/// Errors produced by L402 clients, wallets, gateways and resource servers
#[derive(Debug, thiserror::Error)]
pub enum L402Error {
    /// The body of a 402 response could not be parsed as a challenge
    #[error("Malformed payment challenge: {0}")]
    MalformedChallenge(String),

    /// The payment method is not supported for the referenced offer
    #[error("Payment method '{method}' is not supported for offer '{offer_id}'")]
    UnsupportedPaymentMethod { method: String, offer_id: String },

    /// The selected offer is not part of the challenge
    #[error("Offer {0} not found")]
    OfferNotFound(String),

    /// The wallet failed to pay the challenge
    #[error("Failed to process L402 payment: {0}")]
    WalletPaymentFailed(#[source] Box<L402Error>),

    /// A completion notice is missing the payment context token or the offer id
    #[error("Missing payment context or offer ID")]
    MissingCorrelation,

    /// The wallet is not able to pay at all
    #[error("Payment not supported: {0}")]
    PaymentNotSupported(String),

    /// A challenge was requested without any offers
    #[error("No offers provided")]
    EmptyOffers,

    /// An offer violates its invariants
    #[error("Invalid offer: {0}")]
    InvalidOffer(String),

    /// The payment context token was never issued by this gateway
    #[error("Unknown payment context: {0}")]
    UnknownPaymentContext(String),

    /// The payment instructions are past their expiry
    #[error("Payment request expired at {0}")]
    PaymentRequestExpired(String),

    /// The operator declined to complete the payment
    #[error("The client did not pay")]
    PaymentDeclined,

    /// The resource server refused a payment completion notice
    #[error("Backend failed to process payment: status {status}: {body}")]
    NotificationRejected { status: u16, body: String },

    /// The payment gateway answered with a non-success status
    #[error("Payment gateway error: status {status}: {body}")]
    Gateway { status: u16, body: String },

    /// The request body cannot be cloned for the post-payment retry
    #[error("Request cannot be replayed after payment (streaming body)")]
    RequestNotReplayable,

    /// A transport error during the retry client's request cycle
    #[error("Transport error during {phase}: {source}")]
    Transport {
        phase: RequestPhase,
        #[source]
        source: reqwest::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Timestamp parse error
    #[error("Time error: {0}")]
    Time(#[from] chrono::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl L402Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a malformed challenge error
    pub fn malformed_challenge(message: impl Into<String>) -> Self {
        Self::MalformedChallenge(message.into())
    }

    /// Create an unsupported payment method error
    pub fn unsupported_payment_method(
        method: impl Into<String>,
        offer_id: impl Into<String>,
    ) -> Self {
        Self::UnsupportedPaymentMethod {
            method: method.into(),
            offer_id: offer_id.into(),
        }
    }

    /// Create an offer not found error
    pub fn offer_not_found(offer_id: impl Into<String>) -> Self {
        Self::OfferNotFound(offer_id.into())
    }

    /// Wrap a wallet error
    pub fn wallet_payment_failed(source: L402Error) -> Self {
        Self::WalletPaymentFailed(Box::new(source))
    }

    /// Create a payment not supported error
    pub fn payment_not_supported(message: impl Into<String>) -> Self {
        Self::PaymentNotSupported(message.into())
    }

    /// Create an invalid offer error
    pub fn invalid_offer(message: impl Into<String>) -> Self {
        Self::InvalidOffer(message.into())
    }

    /// Create a gateway error from a response status and body
    pub fn gateway(status: u16, body: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            body: body.into(),
        }
    }

    /// Create a transport error for the given phase
    pub fn transport(phase: RequestPhase, source: reqwest::Error) -> Self {
        Self::Transport { phase, source }
    }

    /// Whether the error is a client-side (4xx class) protocol error
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// HTTP status code a server should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            L402Error::MalformedChallenge(_)
            | L402Error::UnsupportedPaymentMethod { .. }
            | L402Error::OfferNotFound(_)
            | L402Error::MissingCorrelation
            | L402Error::EmptyOffers
            | L402Error::InvalidOffer(_)
            | L402Error::UnknownPaymentContext(_)
            | L402Error::Json(_)
            | L402Error::Url(_)
            | L402Error::Time(_) => 400,
            L402Error::PaymentNotSupported(_) | L402Error::PaymentDeclined => 402,
            L402Error::PaymentRequestExpired(_) => 410,
            L402Error::Gateway { .. } | L402Error::Transport { .. } | L402Error::Http(_) => 502,
            L402Error::WalletPaymentFailed(inner) => inner.status_code(),
            L402Error::NotificationRejected { .. }
            | L402Error::RequestNotReplayable
            | L402Error::Config(_)
            | L402Error::Io(_) => 500,
        }
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for L402Error {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(L402Error::MissingCorrelation.status_code(), 400);
        assert_eq!(
            L402Error::unsupported_payment_method("lightning", "offer_0001").status_code(),
            400
        );
        assert_eq!(L402Error::EmptyOffers.status_code(), 400);
        assert_eq!(
            L402Error::PaymentRequestExpired("2025-01-01T00:00:00Z".into()).status_code(),
            410
        );
        assert_eq!(L402Error::gateway(503, "down").status_code(), 502);
        assert_eq!(L402Error::config("bad").status_code(), 500);
    }

    #[test]
    fn test_wallet_error_keeps_source() {
        let err = L402Error::wallet_payment_failed(L402Error::offer_not_found("offer_9999"));
        assert_eq!(err.status_code(), 400);
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Failed to process L402 payment: Offer offer_9999 not found"
        );

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "Offer offer_9999 not found");
    }

    #[test]
    fn test_unsupported_payment_method_message() {
        let err = L402Error::unsupported_payment_method("lightning", "offer_0001");
        assert_eq!(
            err.to_string(),
            "Payment method 'lightning' is not supported for offer 'offer_0001'"
        );
    }

    #[test]
    fn test_request_phase_display() {
        assert_eq!(RequestPhase::InitialSend.to_string(), "initial send");
        assert_eq!(RequestPhase::RetrySend.to_string(), "retry send");
    }
}
