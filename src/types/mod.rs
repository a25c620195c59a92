//! Core types for the L402 protocol
//!
//! This module defines the wire-format messages exchanged between the client,
//! the resource server and the payment gateway. The types carry no behavior
//! beyond small invariant checks; every other module depends on them.
//!
//! # Architecture
//!
//! The types module is organized as follows:
//! - [`offer`] - Offers, offer types and payment method identifiers
//! - [`payment`] - The 402 challenge, payment requests and completion notices
//! - [`constants`] - Protocol constants (version, methods, headers, paths)
//!
//! # Examples
//!
//! ## Describing an Offer
//!
//! ```
//! use rust_l402::types::{Offer, OfferType, PaymentMethod};
//!
//! let offer = Offer::new("offer_0001", "Pro", OfferType::TopUp, 10, "USD")
//!     .with_description("10 credits for all the datasets in the platform")
//!     .with_balance(10)
//!     .with_payment_method(PaymentMethod::Lightning)
//!     .with_payment_method(PaymentMethod::FakePay);
//!
//! assert!(offer.validate().is_ok());
//! assert!(offer.supports(&PaymentMethod::FakePay));
//! ```
//!
//! ## Requesting Payment Instructions
//!
//! ```
//! use rust_l402::types::{PaymentMethod, PaymentRequestRequest};
//!
//! let request = PaymentRequestRequest::new("offer_0001", PaymentMethod::FakePay, "token");
//! let body = serde_json::to_string(&request).unwrap();
//! assert!(body.contains("\"payment_method\":\"fake-pay\""));
//! ```
//!
//! # Wire Compatibility
//!
//! - The challenge's offers are serialized under the singular key `offer`.
//! - The checkout URL of [`PayReq`] is serialized as `check_url`.
//! - Unknown payment methods are preserved as [`PaymentMethod::Other`].

pub mod constants;
pub mod offer;
pub mod payment;

// Re-export commonly used types
pub use constants::{
    headers, methods, paths, DEFAULT_AUTH_TOKEN, DEFAULT_PAYMENT_REQUEST_TTL, DEFAULT_TERMS_URL,
    L402_VERSION, MAX_PAYMENT_REQUEST_TTL,
};
pub use offer::{Offer, OfferType, PaymentMethod};
pub use payment::{
    ChargeRequest, PayReq, PaymentCompletion, PaymentRequestRequest, PaymentRequestResponse,
    PaymentRequiredResponse,
};
