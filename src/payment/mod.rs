//! Payment gateway seam.
//!
//! Checkout creates a hosted session at the gateway and the order header keeps
//! the session id; confirmation later re-reads the session to learn whether it
//! was paid and which payment intent to keep for refunds.

mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway rejected request ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionLineItem {
    pub name: String,
    /// Minor units.
    pub unit_amount: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSessionRequest {
    pub order_id: Uuid,
    pub success_url: String,
    pub cancel_url: String,
    pub currency: String,
    pub line_items: Vec<SessionLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub payment_status: String,
    pub payment_intent: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status.eq_ignore_ascii_case("paid")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub status: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError>;

    /// Full refund of a captured payment intent.
    async fn refund(&self, payment_intent_id: &str) -> Result<Refund, PaymentError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    mockall::mock! {
        pub Gateway {}

        #[async_trait]
        impl PaymentGateway for Gateway {
            async fn create_checkout_session(
                &self,
                request: CheckoutSessionRequest,
            ) -> Result<CheckoutSession, PaymentError>;
            async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError>;
            async fn refund(&self, payment_intent_id: &str) -> Result<Refund, PaymentError>;
        }
    }
}
