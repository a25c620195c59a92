//! Storage trait for issued challenges
//!
//! The gateway remembers which offers were presented under each payment
//! context token so that a payment request can only buy an offer of the
//! challenge it refers to. Offers are written once, at issuance. The expiry
//! of the payment instructions handed out for an offer is recorded when the
//! payment request resolves, and is what checkout enforces.

use crate::types::{Offer, PaymentRequiredResponse};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for recording challenges and looking up their offers
#[async_trait]
pub trait ChallengeLedger: Send + Sync {
    /// Record the offers of a freshly issued challenge
    async fn record(&self, challenge: &PaymentRequiredResponse) -> Result<()>;

    /// Offers presented under a payment context token
    async fn offers(&self, payment_context_token: &str) -> Result<Option<Vec<Offer>>>;

    /// Record the expiry of payment instructions issued for an offer
    ///
    /// Returns `false` when the token was never issued. Reissuing
    /// instructions for the same offer replaces the previous expiry.
    async fn record_payment_request(
        &self,
        payment_context_token: &str,
        offer_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Expiry of the payment instructions issued for an offer, if any
    async fn payment_request_expiry(
        &self,
        payment_context_token: &str,
        offer_id: &str,
    ) -> Result<Option<DateTime<Utc>>>;
}

#[derive(Debug, Clone)]
struct ChallengeRecord {
    offers: Vec<Offer>,
    expiries: HashMap<String, DateTime<Utc>>,
}

/// In-memory ledger
///
/// Data is lost when the gateway restarts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    challenges: Arc<RwLock<HashMap<String, ChallengeRecord>>>,
}

impl InMemoryLedger {
    /// Create a new in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeLedger for InMemoryLedger {
    async fn record(&self, challenge: &PaymentRequiredResponse) -> Result<()> {
        let mut challenges = self.challenges.write().await;
        challenges
            .entry(challenge.payment_context_token.clone())
            .or_insert_with(|| ChallengeRecord {
                offers: challenge.offers.clone(),
                expiries: HashMap::new(),
            });
        Ok(())
    }

    async fn offers(&self, payment_context_token: &str) -> Result<Option<Vec<Offer>>> {
        let challenges = self.challenges.read().await;
        Ok(challenges
            .get(payment_context_token)
            .map(|record| record.offers.clone()))
    }

    async fn record_payment_request(
        &self,
        payment_context_token: &str,
        offer_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut challenges = self.challenges.write().await;
        match challenges.get_mut(payment_context_token) {
            Some(record) => {
                record.expiries.insert(offer_id.to_string(), expires_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn payment_request_expiry(
        &self,
        payment_context_token: &str,
        offer_id: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let challenges = self.challenges.read().await;
        Ok(challenges
            .get(payment_context_token)
            .and_then(|record| record.expiries.get(offer_id).copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengeIssuer;
    use crate::types::{OfferType, PaymentMethod};

    fn offer(id: &str) -> Offer {
        Offer::new(id, "Pro", OfferType::TopUp, 10, "USD")
            .with_payment_method(PaymentMethod::FakePay)
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.offers("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_and_lookup() {
        let ledger = InMemoryLedger::new();
        let issuer = ChallengeIssuer::new("http://localhost:8081/payment-request");
        let first = issuer.issue_challenge(vec![offer("offer_0001")]).unwrap();
        let second = issuer
            .issue_challenge(vec![offer("offer_0002"), offer("offer_0003")])
            .unwrap();

        ledger.record(&first).await.unwrap();
        ledger.record(&second).await.unwrap();

        let offers = ledger
            .offers(&first.payment_context_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(offers, vec![offer("offer_0001")]);

        let offers = ledger
            .offers(&second.payment_context_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(offers.len(), 2);
    }

    #[tokio::test]
    async fn test_record_is_write_once() {
        let ledger = InMemoryLedger::new();
        let issuer = ChallengeIssuer::new("http://localhost:8081/payment-request");
        let challenge = issuer.issue_challenge(vec![offer("offer_0001")]).unwrap();
        ledger.record(&challenge).await.unwrap();

        let tampered = PaymentRequiredResponse {
            offers: vec![offer("offer_0003")],
            ..challenge.clone()
        };
        ledger.record(&tampered).await.unwrap();

        let offers = ledger
            .offers(&challenge.payment_context_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(offers, vec![offer("offer_0001")]);
    }

    #[tokio::test]
    async fn test_payment_request_expiry() {
        let ledger = InMemoryLedger::new();
        let issuer = ChallengeIssuer::new("http://localhost:8081/payment-request");
        let challenge = issuer.issue_challenge(vec![offer("offer_0001")]).unwrap();
        let token = &challenge.payment_context_token;
        ledger.record(&challenge).await.unwrap();

        assert!(ledger
            .payment_request_expiry(token, "offer_0001")
            .await
            .unwrap()
            .is_none());

        let first = Utc::now();
        let second = first + chrono::Duration::minutes(10);
        assert!(ledger
            .record_payment_request(token, "offer_0001", first)
            .await
            .unwrap());
        assert!(ledger
            .record_payment_request(token, "offer_0001", second)
            .await
            .unwrap());
        assert_eq!(
            ledger
                .payment_request_expiry(token, "offer_0001")
                .await
                .unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_payment_request_for_unknown_token() {
        let ledger = InMemoryLedger::new();
        assert!(!ledger
            .record_payment_request("missing", "offer_0001", Utc::now())
            .await
            .unwrap());
        assert!(ledger
            .payment_request_expiry("missing", "offer_0001")
            .await
            .unwrap()
            .is_none());
    }
}
