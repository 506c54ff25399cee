use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Category, Company, Product},
};

/// Prices are accepted in minor units and must lie between 1 and 1000 major units.
pub const MIN_PRICE: i64 = 100;
pub const MAX_PRICE: i64 = 100_000;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub title: String,
    pub description: String,
    pub isbn: String,
    pub author: String,
    pub list_price: i64,
    pub price: i64,
    pub price50: i64,
    pub price100: i64,
    pub category_id: Uuid,
    pub image_url: Option<String>,
}

impl ProductRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("title", &self.title),
            ("isbn", &self.isbn),
            ("author", &self.author),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} is required")));
            }
        }
        for (field, value) in [
            ("list_price", self.list_price),
            ("price", self.price),
            ("price50", self.price50),
            ("price100", self.price100),
        ] {
            if !(MIN_PRICE..=MAX_PRICE).contains(&value) {
                return Err(AppError::Validation(format!(
                    "{field} must be between {MIN_PRICE} and {MAX_PRICE}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub display_order: i32,
}

impl CategoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > 30 {
            return Err(AppError::Validation(
                "name is required and at most 30 characters".into(),
            ));
        }
        if !(1..=100).contains(&self.display_order) {
            return Err(AppError::Validation(
                "display_order must be between 1 and 100".into(),
            ));
        }
        if name == self.display_order.to_string() {
            return Err(AppError::Validation(
                "display_order cannot exactly match the name".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompanyRequest {
    pub name: String,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
}

impl CompanyRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        Ok(())
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CompanyList {
    #[schema(value_type = Vec<Company>)]
    pub items: Vec<Company>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductRequest {
        ProductRequest {
            title: "Fortune of Time".into(),
            description: "".into(),
            isbn: "SWD9999001".into(),
            author: "Billy Spark".into(),
            list_price: 9_900,
            price: 9_000,
            price50: 8_500,
            price100: 8_000,
            category_id: Uuid::new_v4(),
            image_url: None,
        }
    }

    #[test]
    fn product_prices_must_be_in_range() {
        assert!(product().validate().is_ok());

        let mut cheap = product();
        cheap.price100 = 99;
        assert!(matches!(cheap.validate(), Err(AppError::Validation(_))));

        let mut dear = product();
        dear.list_price = MAX_PRICE + 1;
        assert!(dear.validate().is_err());
    }

    #[test]
    fn product_requires_isbn() {
        let mut p = product();
        p.isbn = " ".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn category_rules() {
        let ok = CategoryRequest {
            name: "Action".into(),
            display_order: 1,
        };
        assert!(ok.validate().is_ok());

        let out_of_range = CategoryRequest {
            name: "Action".into(),
            display_order: 0,
        };
        assert!(out_of_range.validate().is_err());

        let same_as_order = CategoryRequest {
            name: "5".into(),
            display_order: 5,
        };
        assert!(same_as_order.validate().is_err());

        let too_long = CategoryRequest {
            name: "x".repeat(31),
            display_order: 5,
        };
        assert!(too_long.validate().is_err());
    }
}
