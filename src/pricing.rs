use crate::entity::products::Model as ProductModel;

/// Unit price (minor units) for a cart line of `count` items.
///
/// Up to 50 copies use the base price, 51 to 100 the `price50` tier and
/// anything above that the `price100` tier.
pub fn price_for_quantity(product: &ProductModel, count: i32) -> i64 {
    if count <= 50 {
        product.price
    } else if count <= 100 {
        product.price50
    } else {
        product.price100
    }
}

pub fn line_total(product: &ProductModel, count: i32) -> i64 {
    price_for_quantity(product, count) * i64::from(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn product() -> ProductModel {
        ProductModel {
            id: Uuid::new_v4(),
            title: "Dark Skies".into(),
            description: "A thriller".into(),
            isbn: "CAW777777701".into(),
            author: "Nancy Hoover".into(),
            list_price: 1200,
            price: 1000,
            price50: 800,
            price100: 500,
            category_id: Uuid::new_v4(),
            image_url: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn picks_tier_by_quantity() {
        let p = product();
        for (count, expected) in [(1, 1000), (50, 1000), (51, 800), (100, 800), (101, 500)] {
            assert_eq!(price_for_quantity(&p, count), expected, "count {count}");
        }
    }

    #[test]
    fn line_total_multiplies_tier_price() {
        let p = product();
        assert_eq!(line_total(&p, 3), 3000);
        assert_eq!(line_total(&p, 60), 48_000);
    }
}
