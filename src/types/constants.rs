//! Common constants for the L402 protocol

use std::time::Duration;

/// L402 protocol version implemented by this crate
pub const L402_VERSION: &str = "0.2.2";

/// Terms and conditions URL advertised in challenges unless configured otherwise
pub const DEFAULT_TERMS_URL: &str = "https://example.com/terms";

/// How long payment instructions stay valid after they are issued
pub const DEFAULT_PAYMENT_REQUEST_TTL: Duration = Duration::from_secs(10 * 60);

/// Longest TTL a gateway accepts for payment instructions
pub const MAX_PAYMENT_REQUEST_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Bearer token shared by the demo resource server and client
pub const DEFAULT_AUTH_TOKEN: &str = "01badad5-f2f0-43cf-be44-4f8e1c4d8641";

/// Well-known payment method identifiers
///
/// Payment methods can be added without breaking the protocol. All payments
/// happen out of band; L402 only makes sure the client gets the right
/// payment details.
pub mod methods {
    /// Lightning Network invoice
    pub const LIGHTNING: &str = "lightning";
    /// On-chain transfer to an address
    pub const ONCHAIN: &str = "onchain";
    /// Web checkout with a credit card
    pub const CREDIT_CARD: &str = "credit_card";
    /// Simulated payment used to exercise the flow end to end
    pub const FAKE_PAY: &str = "fake-pay";
}

/// HTTP headers carrying the payment completion notice
pub mod headers {
    /// Payment context token of the completed payment
    pub const PAYMENT_CONTEXT: &str = "X-Payment-Context";
    /// Offer that was paid for
    pub const OFFER_ID: &str = "X-Offer-ID";
}

/// HTTP paths used by the demo gateway and resource server
pub mod paths {
    /// Gateway: issue a challenge for a set of offers
    pub const CHARGE: &str = "/charge";
    /// Gateway: obtain payment instructions for an offer
    pub const PAYMENT_REQUEST: &str = "/payment-request";
    /// Gateway: simulated out-of-band checkout page
    pub const CHECKOUT: &str = "/checkout";
    /// Resource server: payment completion webhook
    pub const PAYMENT_SUCCESS: &str = "/payment-success";
    /// Resource server: the protected resource
    pub const PRIVATE_RESOURCE: &str = "/private-resource";
    /// Health check on both servers
    pub const HEALTH: &str = "/health";
}
