//! Offer types

use super::constants::methods;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A way of paying for an offer
///
/// Unknown identifiers are kept verbatim in [`PaymentMethod::Other`] so that
/// challenges advertising new methods still parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Lightning Network invoice
    Lightning,
    /// On-chain transfer
    Onchain,
    /// Credit card checkout
    CreditCard,
    /// Simulated payment for demos and tests
    FakePay,
    /// Any other method identifier
    Other(String),
}

impl PaymentMethod {
    /// Wire identifier of the method
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Lightning => methods::LIGHTNING,
            PaymentMethod::Onchain => methods::ONCHAIN,
            PaymentMethod::CreditCard => methods::CREDIT_CARD,
            PaymentMethod::FakePay => methods::FAKE_PAY,
            PaymentMethod::Other(other) => other,
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(value: &str) -> Self {
        match value {
            methods::LIGHTNING => PaymentMethod::Lightning,
            methods::ONCHAIN => PaymentMethod::Onchain,
            methods::CREDIT_CARD => PaymentMethod::CreditCard,
            methods::FAKE_PAY => PaymentMethod::FakePay,
            other => PaymentMethod::Other(other.to_string()),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        PaymentMethod::from(value.as_str())
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of purchase an offer represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OfferType {
    /// One-time payment for a product or service (flights, carts, domains)
    OneTime,
    /// One-time payment adding credits to a balance (metered usage)
    TopUp,
    /// Recurring payment (SaaS)
    Subscription,
}

/// A purchasable unit presented in a challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Stable identifier of the offer
    pub id: String,
    /// Short title of what is being purchased
    pub title: String,
    /// Description of the product or service
    pub description: String,
    /// Offer type
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    /// Credits added by a top-up offer
    #[serde(default)]
    pub balance: u64,
    /// Price in the smallest unit of the currency
    pub amount: u64,
    /// Currency of the amount (USD, EUR, BTC, ...)
    pub currency: String,
    /// How the client can pay this offer
    pub payment_methods: Vec<PaymentMethod>,
}

impl Offer {
    /// Create a new offer without any payment method
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        offer_type: OfferType,
        amount: u64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            offer_type,
            balance: 0,
            amount,
            currency: currency.into(),
            payment_methods: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the credits granted by a top-up offer
    pub fn with_balance(mut self, balance: u64) -> Self {
        self.balance = balance;
        self
    }

    /// Add a supported payment method
    pub fn with_payment_method(mut self, method: impl Into<PaymentMethod>) -> Self {
        let method = method.into();
        if !self.payment_methods.contains(&method) {
            self.payment_methods.push(method);
        }
        self
    }

    /// Whether the offer can be paid with the given method
    pub fn supports(&self, method: &PaymentMethod) -> bool {
        self.payment_methods.contains(method)
    }

    /// Check the offer invariants
    pub fn validate(&self) -> crate::Result<()> {
        if self.id.is_empty() {
            return Err(crate::L402Error::invalid_offer("offer id cannot be empty"));
        }
        if self.payment_methods.is_empty() {
            return Err(crate::L402Error::invalid_offer(format!(
                "offer {} has no payment methods",
                self.id
            )));
        }
        Ok(())
    }

    /// Price in major currency units, e.g. `1.00` for an amount of 100
    pub fn display_price(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.amount), 2)
    }
}
