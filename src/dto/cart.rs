use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{OrderHeader, Product},
};

/// Largest number of copies a single cart line may hold.
pub const MAX_LINE_COUNT: i32 = 1000;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    /// 1..=1000
    pub count: i32,
}

impl AddToCartRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_LINE_COUNT).contains(&self.count) {
            return Err(AppError::Validation(format!(
                "count must be between 1 and {MAX_LINE_COUNT}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub product: Product,
    pub count: i32,
    /// Tier price for this line's count, minor units.
    pub unit_price: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub order_total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ShippingDetails {
    pub name: String,
    pub phone_number: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl ShippingDetails {
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = [
            ("name", &self.name),
            ("phone_number", &self.phone_number),
            ("street_address", &self.street_address),
            ("city", &self.city),
            ("state", &self.state),
            ("postal_code", &self.postal_code),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::Validation(format!("{field} is required")));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub cart: CartView,
    pub shipping: ShippingDetails,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrder {
    pub order: OrderHeader,
    /// Hosted payment page to redirect the customer to; absent for company accounts.
    pub payment_url: Option<String>,
}
