//! Storage trait for per-context access state
//!
//! Each payment context token is either unpaid or paid. The transition is
//! driven only by completion notices from the gateway and is monotonic: once
//! paid, a context never reverts. Contexts are bound to the subject (bearer
//! token) they were issued to, and a subject has access as soon as one of its
//! contexts is paid.

use crate::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for tracking which payment contexts have been paid
#[async_trait]
pub trait AccessStore: Send + Sync {
    /// Bind a freshly issued payment context to the subject it was issued to
    async fn bind(&self, payment_context_token: &str, subject: &str) -> Result<()>;

    /// Mark a payment context as paid
    ///
    /// Returns `true` if this call performed the unpaid to paid transition and
    /// `false` if the context was already paid.
    async fn mark_paid(&self, payment_context_token: &str, offer_id: &str) -> Result<bool>;

    /// Whether the payment context has been paid
    async fn is_paid(&self, payment_context_token: &str) -> Result<bool>;

    /// Whether any payment context bound to the subject has been paid
    async fn has_access(&self, subject: &str) -> Result<bool>;
}

#[derive(Debug, Default)]
struct ContextAccess {
    subject: Option<String>,
    paid_offer: Option<String>,
}

#[derive(Debug, Default)]
struct AccessState {
    contexts: HashMap<String, ContextAccess>,
    paid_subjects: HashSet<String>,
}

/// In-memory access store
///
/// All transitions happen under a single write lock, so marking a context
/// paid is a compare-and-set. Data is lost when the server restarts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccessStore {
    state: Arc<RwLock<AccessState>>,
}

impl InMemoryAccessStore {
    /// Create a new in-memory access store
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer recorded for a paid context
    pub async fn paid_offer(&self, payment_context_token: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .contexts
            .get(payment_context_token)
            .and_then(|context| context.paid_offer.clone())
    }
}

#[async_trait]
impl AccessStore for InMemoryAccessStore {
    async fn bind(&self, payment_context_token: &str, subject: &str) -> Result<()> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let context = state
            .contexts
            .entry(payment_context_token.to_string())
            .or_default();
        if context.subject.is_none() {
            context.subject = Some(subject.to_string());
        }
        // a notice may arrive before the binding
        if context.paid_offer.is_some() {
            if let Some(subject) = context.subject.clone() {
                state.paid_subjects.insert(subject);
            }
        }
        Ok(())
    }

    async fn mark_paid(&self, payment_context_token: &str, offer_id: &str) -> Result<bool> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let context = state
            .contexts
            .entry(payment_context_token.to_string())
            .or_default();
        if context.paid_offer.is_some() {
            return Ok(false);
        }
        context.paid_offer = Some(offer_id.to_string());
        if let Some(subject) = context.subject.clone() {
            state.paid_subjects.insert(subject);
        }
        Ok(true)
    }

    async fn is_paid(&self, payment_context_token: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .contexts
            .get(payment_context_token)
            .is_some_and(|context| context.paid_offer.is_some()))
    }

    async fn has_access(&self, subject: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.paid_subjects.contains(subject))
    }
}
