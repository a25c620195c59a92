//! Payment-related types

use super::constants::L402_VERSION;
use super::offer::{Offer, PaymentMethod};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Payment required response (the HTTP 402 challenge)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequiredResponse {
    /// Protocol version
    pub version: String,
    /// Where the client requests payment instructions for an offer
    pub payment_request_url: String,
    /// Unique identifier linking the payment to this challenge
    pub payment_context_token: String,
    /// Offers presented to the client
    #[serde(rename = "offer", default)]
    pub offers: Vec<Offer>,
    /// Terms and conditions
    #[serde(default)]
    pub terms_url: String,
}

impl PaymentRequiredResponse {
    /// Find an offer of this challenge by id
    pub fn find_offer(&self, offer_id: &str) -> Option<&Offer> {
        self.offers.iter().find(|offer| offer.id == offer_id)
    }

    /// Ids of the offers, in presentation order
    pub fn offer_ids(&self) -> Vec<&str> {
        self.offers.iter().map(|offer| offer.id.as_str()).collect()
    }
}

/// Request for payment instructions, sent by the client to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequestRequest {
    /// Offer the client wants to buy
    pub offer_id: String,
    /// Method the client wants to pay with
    pub payment_method: PaymentMethod,
    /// Payment context token of the challenge being paid
    pub payment_context_token: String,
    /// Chain for on-chain payments
    #[serde(default)]
    pub chain: String,
    /// Asset for on-chain payments
    #[serde(default)]
    pub asset: String,
}

impl PaymentRequestRequest {
    /// Create a new payment request for an offer of a challenge
    pub fn new(
        offer_id: impl Into<String>,
        payment_method: impl Into<PaymentMethod>,
        payment_context_token: impl Into<String>,
    ) -> Self {
        Self {
            offer_id: offer_id.into(),
            payment_method: payment_method.into(),
            payment_context_token: payment_context_token.into(),
            chain: String::new(),
            asset: String::new(),
        }
    }

    /// Set the chain and asset of an on-chain payment
    pub fn with_onchain(mut self, chain: impl Into<String>, asset: impl Into<String>) -> Self {
        self.chain = chain.into();
        self.asset = asset.into();
        self
    }
}

/// Method-specific payment instructions
///
/// Every field is present on the wire; only the ones belonging to the
/// requested method are non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayReq {
    /// Lightning invoice
    #[serde(default)]
    pub lightning_invoice: String,
    /// On-chain destination address
    #[serde(default)]
    pub address: String,
    /// On-chain asset
    #[serde(default)]
    pub asset: String,
    /// On-chain chain
    #[serde(default)]
    pub chain: String,
    /// Web based payment flow, used for card payments
    #[serde(rename = "check_url", default)]
    pub checkout_url: String,
}

impl PayReq {
    /// Instructions for a Lightning payment
    pub fn lightning(invoice: impl Into<String>) -> Self {
        Self {
            lightning_invoice: invoice.into(),
            ..Self::default()
        }
    }

    /// Instructions for an on-chain payment
    pub fn onchain(
        address: impl Into<String>,
        asset: impl Into<String>,
        chain: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            asset: asset.into(),
            chain: chain.into(),
            ..Self::default()
        }
    }

    /// Instructions for a web checkout
    pub fn checkout(url: impl Into<String>) -> Self {
        Self {
            checkout_url: url.into(),
            ..Self::default()
        }
    }
}

/// Payment instructions returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequestResponse {
    /// Version implemented by the gateway
    pub version: String,
    /// When the instructions expire (RFC3339)
    pub expires_at: String,
    /// Payment request details
    pub payment_request: PayReq,
}

impl PaymentRequestResponse {
    /// Create a new response expiring at the given instant
    pub fn new(expires_at: DateTime<Utc>, payment_request: PayReq) -> Self {
        Self {
            version: L402_VERSION.to_string(),
            expires_at: expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            payment_request,
        }
    }

    /// Parse the expiry timestamp
    pub fn expires_at(&self) -> crate::Result<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(&self.expires_at)?.with_timezone(&Utc))
    }

    /// Whether the instructions are expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> crate::Result<bool> {
        Ok(self.expires_at()? <= now)
    }
}

/// Request from a resource server asking the gateway to issue a challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Offers to present to the client
    pub offers: Vec<Offer>,
}

/// Completion signal sent by the gateway once a payment is confirmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCompletion {
    /// Payment context token of the paid challenge
    pub payment_context_token: String,
    /// Offer that was paid for
    pub offer_id: String,
}

impl PaymentCompletion {
    /// Create a completion signal, rejecting empty correlation fields
    pub fn new(
        payment_context_token: impl Into<String>,
        offer_id: impl Into<String>,
    ) -> crate::Result<Self> {
        let completion = Self {
            payment_context_token: payment_context_token.into(),
            offer_id: offer_id.into(),
        };
        if completion.payment_context_token.is_empty() || completion.offer_id.is_empty() {
            return Err(crate::L402Error::MissingCorrelation);
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OfferType;
    use chrono::Duration;
    use serde_json::json;

    fn sample_challenge() -> PaymentRequiredResponse {
        PaymentRequiredResponse {
            version: L402_VERSION.to_string(),
            payment_request_url: "http://localhost:8081/payment-request".to_string(),
            payment_context_token: "7c1e1f0a-5d55-4b0e-8a39-0b6b0d7d6f61".to_string(),
            offers: vec![
                Offer::new("offer_0001", "Pro", OfferType::TopUp, 10, "USD")
                    .with_balance(10)
                    .with_payment_method(PaymentMethod::FakePay),
                Offer::new("offer_0002", "Dataset purchase", OfferType::OneTime, 100, "USD")
                    .with_payment_method(PaymentMethod::Lightning)
                    .with_payment_method(PaymentMethod::Onchain),
            ],
            terms_url: "https://example.com/terms".to_string(),
        }
    }

    #[test]
    fn test_challenge_offers_field_is_singular_on_the_wire() {
        let value = serde_json::to_value(sample_challenge()).unwrap();
        assert!(value.get("offers").is_none());
        assert_eq!(value["offer"].as_array().unwrap().len(), 2);
        assert_eq!(value["offer"][0]["id"], "offer_0001");
    }

    #[test]
    fn test_challenge_round_trip() {
        let challenge = sample_challenge();
        let encoded = serde_json::to_string(&challenge).unwrap();
        let decoded: PaymentRequiredResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, challenge);

        let empty = PaymentRequiredResponse {
            offers: Vec::new(),
            ..challenge
        };
        let encoded = serde_json::to_string(&empty).unwrap();
        let decoded: PaymentRequiredResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, empty);
    }

    #[test]
    fn test_challenge_parses_reference_payload() {
        let body = json!({
            "version": "0.2.2",
            "payment_request_url": "http://localhost:8081/payment-request",
            "payment_context_token": "demo-token-123",
            "offer": [{
                "id": "offer_0003",
                "title": "Unlimited",
                "description": "Unlimited access to all the datasets in the platform",
                "type": "subscription",
                "balance": 0,
                "amount": 500,
                "currency": "USD",
                "payment_methods": ["lightning", "onchain", "credit_card", "fake-pay"]
            }],
            "terms_url": ""
        });
        let challenge: PaymentRequiredResponse = serde_json::from_value(body).unwrap();
        let offer = challenge.find_offer("offer_0003").unwrap();
        assert_eq!(offer.offer_type, OfferType::Subscription);
        assert!(offer.supports(&PaymentMethod::CreditCard));
        assert!(challenge.find_offer("offer_0001").is_none());
    }

    #[test]
    fn test_payment_request_request_wire_format() {
        let request =
            PaymentRequestRequest::new("offer_0002", PaymentMethod::Onchain, "token-1")
                .with_onchain("bitcoin", "btc");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "offer_id": "offer_0002",
                "payment_method": "onchain",
                "payment_context_token": "token-1",
                "chain": "bitcoin",
                "asset": "btc"
            })
        );

        let minimal: PaymentRequestRequest = serde_json::from_value(json!({
            "offer_id": "offer_0001",
            "payment_method": "fake-pay",
            "payment_context_token": "token-1"
        }))
        .unwrap();
        assert_eq!(minimal.chain, "");
        assert_eq!(minimal.payment_method, PaymentMethod::FakePay);
    }

    #[test]
    fn test_payment_request_response_wire_format() {
        let expires_at = DateTime::parse_from_rfc3339("2025-12-31T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);
        let response = PaymentRequestResponse::new(
            expires_at,
            PayReq::checkout("http://localhost:8081/checkout"),
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["version"], L402_VERSION);
        assert_eq!(value["expires_at"], "2025-12-31T23:59:59Z");
        assert_eq!(
            value["payment_request"],
            json!({
                "lightning_invoice": "",
                "address": "",
                "asset": "",
                "chain": "",
                "check_url": "http://localhost:8081/checkout"
            })
        );

        let decoded: PaymentRequestResponse = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, response);
        assert_eq!(decoded.expires_at().unwrap(), expires_at);
    }

    #[test]
    fn test_payment_request_response_expiry() {
        let now = Utc::now();
        let response =
            PaymentRequestResponse::new(now + Duration::minutes(10), PayReq::lightning("lnbc1"));
        assert!(!response.is_expired_at(now).unwrap());
        assert!(response.is_expired_at(now + Duration::minutes(11)).unwrap());

        let broken = PaymentRequestResponse {
            expires_at: "tomorrow".to_string(),
            ..response
        };
        assert!(matches!(
            broken.expires_at(),
            Err(crate::L402Error::Time(_))
        ));
    }

    #[test]
    fn test_payment_completion_requires_both_fields() {
        assert!(PaymentCompletion::new("token-1", "offer_0001").is_ok());
        assert!(matches!(
            PaymentCompletion::new("", "offer_0001"),
            Err(crate::L402Error::MissingCorrelation)
        ));
        assert!(matches!(
            PaymentCompletion::new("token-1", ""),
            Err(crate::L402Error::MissingCorrelation)
        ));
    }
}
