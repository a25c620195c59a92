//! Challenge issuance
//!
//! A [`ChallengeIssuer`] turns a set of offers into a
//! [`PaymentRequiredResponse`] carrying a freshly minted payment context
//! token. The token is the only thing correlating the challenge with the
//! payment request and the completion notice, so it is a random UUIDv4
//! drawn from the operating system's CSPRNG and is never reused.

use crate::types::{Offer, PaymentRequiredResponse, DEFAULT_TERMS_URL, L402_VERSION};
use crate::{L402Error, Result};
use uuid::Uuid;

/// Builds payment-required challenges
#[derive(Debug, Clone)]
pub struct ChallengeIssuer {
    payment_request_url: String,
    terms_url: String,
    version: String,
}

impl ChallengeIssuer {
    /// Create an issuer pointing clients at the given payment request URL
    pub fn new(payment_request_url: impl Into<String>) -> Self {
        Self {
            payment_request_url: payment_request_url.into(),
            terms_url: DEFAULT_TERMS_URL.to_string(),
            version: L402_VERSION.to_string(),
        }
    }

    /// Set the terms and conditions URL
    pub fn with_terms_url(mut self, terms_url: impl Into<String>) -> Self {
        self.terms_url = terms_url.into();
        self
    }

    /// Payment request URL advertised in challenges
    pub fn payment_request_url(&self) -> &str {
        &self.payment_request_url
    }

    /// Issue a new challenge for the given offers
    pub fn issue_challenge(&self, offers: Vec<Offer>) -> Result<PaymentRequiredResponse> {
        if offers.is_empty() {
            return Err(L402Error::EmptyOffers);
        }
        for offer in &offers {
            offer.validate()?;
        }

        Ok(PaymentRequiredResponse {
            version: self.version.clone(),
            payment_request_url: self.payment_request_url.clone(),
            payment_context_token: Uuid::new_v4().to_string(),
            offers,
            terms_url: self.terms_url.clone(),
        })
    }
}
