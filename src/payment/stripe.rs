use async_trait::async_trait;
use serde::Deserialize;

use super::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway, Refund};
use crate::config::StripeConfig;

/// Stripe REST client (form-encoded requests, bearer secret key).
#[derive(Clone)]
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base, path)
    }

    async fn read<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let message = match response.json::<StripeErrorBody>().await {
            Ok(body) => body.error.message.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Err(PaymentError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

pub(crate) fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("client_reference_id".to_string(), request.order_id.to_string()),
        ("metadata[order_id]".to_string(), request.order_id.to_string()),
    ];
    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }
    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let form = session_form(&request);
        let response = self
            .http
            .post(self.url("checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let session: CheckoutSession = Self::read(response).await?;
        tracing::info!(order_id = %request.order_id, session_id = %session.id, "checkout session created");
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .http
            .get(self.url(&format!("checkout/sessions/{session_id}")))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn refund(&self, payment_intent_id: &str) -> Result<Refund, PaymentError> {
        let form = [
            ("reason", "requested_by_customer"),
            ("payment_intent", payment_intent_id),
        ];
        let response = self
            .http
            .post(self.url("refunds"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let refund: Refund = Self::read(response).await?;
        tracing::info!(payment_intent_id, refund_id = %refund.id, "payment refunded");
        Ok(refund)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::SessionLineItem;
    use uuid::Uuid;

    #[test]
    fn builds_indexed_line_items() {
        let order_id = Uuid::new_v4();
        let form = session_form(&CheckoutSessionRequest {
            order_id,
            success_url: "https://shop.test/ok".into(),
            cancel_url: "https://shop.test/cart".into(),
            currency: "usd".into(),
            line_items: vec![
                SessionLineItem {
                    name: "Dark Skies".into(),
                    unit_amount: 3000,
                    quantity: 2,
                },
                SessionLineItem {
                    name: "Cotton Candy".into(),
                    unit_amount: 6500,
                    quantity: 1,
                },
            ],
        });

        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("client_reference_id"), Some(order_id.to_string().as_str()));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("3000"));
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
        assert_eq!(
            get("line_items[1][price_data][product_data][name]"),
            Some("Cotton Candy")
        );
        assert_eq!(get("line_items[1][price_data][currency]"), Some("usd"));
    }

    #[test]
    fn trims_trailing_slash_from_api_base() {
        let gateway = StripeGateway::new(&StripeConfig {
            secret_key: "sk_test".into(),
            api_base: "http://localhost:12111/".into(),
            currency: "usd".into(),
        });
        assert_eq!(
            gateway.url("refunds"),
            "http://localhost:12111/v1/refunds"
        );
    }
}
