use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{OrderDetail, OrderHeader},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithDetails {
    pub order: OrderHeader,
    pub details: Vec<OrderDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderHeader>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderDetailRequest {
    pub name: String,
    pub phone_number: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShipOrderRequest {
    pub carrier: String,
    pub tracking_number: String,
}

impl ShipOrderRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.carrier.trim().is_empty() {
            return Err(AppError::Validation("carrier is required".into()));
        }
        if self.tracking_number.trim().is_empty() {
            return Err(AppError::Validation("tracking_number is required".into()));
        }
        Ok(())
    }
}

/// Gateway session opened for an order that still has to be paid.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentRedirect {
    pub order_id: Uuid,
    pub session_id: String,
    pub payment_url: Option<String>,
}
