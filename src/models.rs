use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        categories::Model as CategoryModel, companies::Model as CompanyModel,
        order_details::Model as OrderDetailModel, order_headers::Model as OrderHeaderModel,
        products::Model as ProductModel, users::Model as UserModel,
    },
    status::{OrderStatus, PaymentStatus, Role},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub company_id: Option<Uuid>,
    pub lockout_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            street_address: model.street_address,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            phone_number: model.phone_number,
            company_id: model.company_id,
            lockout_end: model.lockout_end.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
}

impl From<CompanyModel> for Company {
    fn from(model: CompanyModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            street_address: model.street_address,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            phone_number: model.phone_number,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub display_order: i32,
}

impl From<CategoryModel> for Category {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            display_order: model.display_order,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub isbn: String,
    pub author: String,
    pub list_price: i64,
    pub price: i64,
    pub price50: i64,
    pub price100: i64,
    pub category_id: Uuid,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn with_category(model: ProductModel, category: Option<CategoryModel>) -> Self {
        let mut product = Self::from(model);
        product.category = category.map(|c| c.name);
        product
    }
}

impl From<ProductModel> for Product {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            isbn: model.isbn,
            author: model.author,
            list_price: model.list_price,
            price: model.price,
            price50: model.price50,
            price100: model.price100,
            category_id: model.category_id,
            category: None,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderHeader {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub shipping_date: Option<DateTime<Utc>>,
    pub order_total: i64,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_due_date: Option<DateTime<Utc>>,
    pub session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub name: String,
    pub phone_number: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderHeaderModel> for OrderHeader {
    fn from(model: OrderHeaderModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            order_date: model.order_date.with_timezone(&Utc),
            shipping_date: model.shipping_date.map(|dt| dt.with_timezone(&Utc)),
            order_total: model.order_total,
            order_status: model.order_status,
            payment_status: model.payment_status,
            tracking_number: model.tracking_number,
            carrier: model.carrier,
            payment_date: model.payment_date.map(|dt| dt.with_timezone(&Utc)),
            payment_due_date: model.payment_due_date.map(|dt| dt.with_timezone(&Utc)),
            session_id: model.session_id,
            payment_intent_id: model.payment_intent_id,
            name: model.name,
            phone_number: model.phone_number,
            street_address: model.street_address,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub id: Uuid,
    pub order_header_id: Uuid,
    pub product_id: Uuid,
    pub product_title: Option<String>,
    pub count: i32,
    pub price: i64,
}

impl OrderDetail {
    pub fn with_product(model: OrderDetailModel, product: Option<ProductModel>) -> Self {
        Self {
            id: model.id,
            order_header_id: model.order_header_id,
            product_id: model.product_id,
            product_title: product.map(|p| p.title),
            count: model.count,
            price: model.price,
        }
    }
}
