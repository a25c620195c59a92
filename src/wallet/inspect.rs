//! Wallet that only displays the challenge

use super::Wallet;
use crate::types::PaymentRequiredResponse;
use crate::{L402Error, Result};
use async_trait::async_trait;

/// Lists the offers of a challenge without paying
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectWallet;

impl InspectWallet {
    /// Create a new inspect wallet
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Wallet for InspectWallet {
    async fn pay(&self, challenge: &PaymentRequiredResponse) -> Result<()> {
        println!("Available offers:");
        for offer in &challenge.offers {
            tracing::info!(
                offer_id = %offer.id,
                title = %offer.title,
                price = %offer.display_price(),
                currency = %offer.currency,
                payment_methods = ?offer.payment_methods,
                "offer"
            );
            println!("  Offer ID: {}", offer.id);
            println!("  Title: {}", offer.title);
            println!("  Price: ${} {}", offer.display_price(), offer.currency);
            println!("  Supported Payment Methods: {:?}", offer.payment_methods);
            println!(" --------\n");
        }

        Err(L402Error::payment_not_supported(
            "mock wallet cannot process payments, run client with --fake to simulate a payment",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Offer, OfferType, PaymentMethod};

    #[tokio::test]
    async fn test_inspect_wallet_never_pays() {
        let challenge = PaymentRequiredResponse {
            version: "0.2.2".to_string(),
            payment_request_url: "http://gateway.test/payment-request".to_string(),
            payment_context_token: "ctx-1".to_string(),
            offers: vec![Offer::new("offer_0001", "Pro", OfferType::TopUp, 10, "USD")
                .with_payment_method(PaymentMethod::Lightning)],
            terms_url: String::new(),
        };

        let err = InspectWallet::new().pay(&challenge).await.unwrap_err();
        assert!(matches!(err, L402Error::PaymentNotSupported(_)));
        assert!(err.to_string().contains("--fake"));
    }
}
