//! Wallets paying L402 challenges
//!
//! A [`Wallet`] receives the parsed challenge of a 402 response and either
//! completes a payment for one of its offers or fails. The [`L402Client`]
//! retries the original request only after a successful payment.
//!
//! [`L402Client`]: crate::client::L402Client

pub mod confirm;
pub mod fake;
pub mod inspect;

pub use confirm::{CheckoutVisitor, FixedConfirmation, PaymentConfirmation, StdinConfirmation};
pub use fake::FakeWallet;
pub use inspect::InspectWallet;

use crate::types::PaymentRequiredResponse;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Capability to pay a challenge
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Pay one of the offers of `challenge`
    async fn pay(&self, challenge: &PaymentRequiredResponse) -> Result<()>;
}

#[async_trait]
impl<W: Wallet + ?Sized> Wallet for Arc<W> {
    async fn pay(&self, challenge: &PaymentRequiredResponse) -> Result<()> {
        (**self).pay(challenge).await
    }
}

#[async_trait]
impl<W: Wallet + ?Sized> Wallet for Box<W> {
    async fn pay(&self, challenge: &PaymentRequiredResponse) -> Result<()> {
        (**self).pay(challenge).await
    }
}
