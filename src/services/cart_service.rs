use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{
        AddToCartRequest, CartLine, CartSummary, CartView, MAX_LINE_COUNT, ShippingDetails,
    },
    entity::{
        products::{Entity as Products, Model as ProductModel},
        shopping_carts::{
            ActiveModel as CartActive, Column as CartCol, Entity as ShoppingCarts, Model as CartModel,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    pricing,
    repository::shopping_cart,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub(crate) fn cart_line(line: CartModel, product: ProductModel) -> CartLine {
    let unit_price = pricing::price_for_quantity(&product, line.count);
    CartLine {
        id: line.id,
        count: line.count,
        unit_price,
        line_total: unit_price * i64::from(line.count),
        product: product.into(),
    }
}

/// Count of a line after adding `added` copies, capped at [`MAX_LINE_COUNT`].
pub(crate) fn merged_count(current: i32, added: i32) -> AppResult<i32> {
    current
        .checked_add(added)
        .filter(|count| *count <= MAX_LINE_COUNT)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "a cart line cannot hold more than {MAX_LINE_COUNT} copies"
            ))
        })
}

pub(crate) fn build_cart_view(rows: Vec<(CartModel, ProductModel)>) -> CartView {
    let lines: Vec<CartLine> = rows
        .into_iter()
        .map(|(line, product)| cart_line(line, product))
        .collect();
    let order_total = lines.iter().map(|line| line.line_total).sum();
    CartView { lines, order_total }
}

async fn load_cart(state: &AppState, user_id: Uuid) -> AppResult<CartView> {
    let rows = shopping_cart::lines_with_products(&state.orm, user_id).await?;
    Ok(build_cart_view(rows))
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let cart = load_cart(state, user.user_id).await?;
    let meta = Meta::new(1, cart.lines.len() as i64, cart.lines.len() as i64);
    Ok(ApiResponse::success("OK", cart, Some(meta)))
}

pub async fn summary(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartSummary>> {
    let profile = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let cart = load_cart(state, user.user_id).await?;

    let shipping = ShippingDetails {
        name: profile.name,
        phone_number: profile.phone_number.unwrap_or_default(),
        street_address: profile.street_address.unwrap_or_default(),
        city: profile.city.unwrap_or_default(),
        state: profile.state.unwrap_or_default(),
        postal_code: profile.postal_code.unwrap_or_default(),
    };

    Ok(ApiResponse::success(
        "OK",
        CartSummary { cart, shipping },
        Some(Meta::empty()),
    ))
}

/// Adds `count` copies of a product, merging into an existing line.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartLine>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let product = Products::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let existing = ShoppingCarts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::ProductId.eq(payload.product_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let line = match existing {
        Some(line) => {
            let count = merged_count(line.count, payload.count)?;
            let mut active: CartActive = line.into();
            active.count = Set(count);
            active.update(&txn).await?
        }
        None => {
            CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(payload.product_id),
                count: Set(payload.count),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "shopping_carts",
        serde_json::json!({ "product_id": payload.product_id, "count": line.count }),
    )
    .await;

    Ok(ApiResponse::success("Cart updated", cart_line(line, product), None))
}

pub async fn plus(
    state: &AppState,
    user: &AuthUser,
    cart_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let line = shopping_cart::find_line(&state.orm, user.user_id, cart_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let count = merged_count(line.count, 1)?;
    let mut active: CartActive = line.into();
    active.count = Set(count);
    active.update(&state.orm).await?;

    let cart = load_cart(state, user.user_id).await?;
    Ok(ApiResponse::success("Cart updated", cart, None))
}

/// Decrements a line; the last copy removes the line.
pub async fn minus(
    state: &AppState,
    user: &AuthUser,
    cart_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let line = shopping_cart::find_line(&state.orm, user.user_id, cart_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if line.count <= 1 {
        let product_id = line.product_id;
        line.delete(&state.orm).await?;
        audit::record(
            &state.orm,
            user.user_id,
            "cart_remove",
            "shopping_carts",
            serde_json::json!({ "product_id": product_id }),
        )
        .await;
    } else {
        let count = line.count - 1;
        let mut active: CartActive = line.into();
        active.count = Set(count);
        active.update(&state.orm).await?;
    }

    let cart = load_cart(state, user.user_id).await?;
    Ok(ApiResponse::success("Cart updated", cart, None))
}

pub async fn remove(
    state: &AppState,
    user: &AuthUser,
    cart_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let result = ShoppingCarts::delete_many()
        .filter(CartCol::Id.eq(cart_id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "cart_remove",
        "shopping_carts",
        serde_json::json!({ "cart_id": cart_id }),
    )
    .await;

    let cart = load_cart(state, user.user_id).await?;
    Ok(ApiResponse::success("Removed from cart", cart, Some(Meta::empty())))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::entity::{products::Model as ProductModel, shopping_carts::Model as CartModel};

    pub fn product(title: &str, price: i64, price50: i64, price100: i64) -> ProductModel {
        ProductModel {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            isbn: format!("ISBN-{title}"),
            author: "Author".into(),
            list_price: price + 100,
            price,
            price50,
            price100,
            category_id: Uuid::new_v4(),
            image_url: None,
            created_at: Utc::now().into(),
        }
    }

    pub fn line(user_id: Uuid, product: &ProductModel, count: i32) -> CartModel {
        CartModel {
            id: Uuid::new_v4(),
            user_id,
            product_id: product.id,
            count,
            created_at: Utc::now().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::fixtures::{line, product};
    use super::*;
    use crate::{
        config::sample_config, entity::audit_logs::Model as AuditModel,
        payment::mock::MockGateway, status::Role,
    };

    fn customer() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
        }
    }

    fn state(db: MockDatabase) -> AppState {
        AppState {
            orm: db.into_connection(),
            config: Arc::new(sample_config()),
            payments: Arc::new(MockGateway::new()),
        }
    }

    fn audit_row(user_id: Uuid) -> AuditModel {
        AuditModel {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            action: "cart_remove".into(),
            resource: Some("shopping_carts".into()),
            metadata: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn merged_count_is_capped() {
        assert_eq!(merged_count(2, 3).unwrap(), 5);
        assert_eq!(merged_count(999, 1).unwrap(), MAX_LINE_COUNT);
        assert!(matches!(merged_count(MAX_LINE_COUNT, 1), Err(AppError::Validation(_))));
        assert!(matches!(merged_count(i32::MAX - 1, 5), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn adding_past_the_line_cap_is_rejected() {
        let user = customer();
        let book = product("Dark Skies", 3_000, 2_500, 2_000);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![book.clone()]])
            .append_query_results([vec![line(user.user_id, &book, 999)]]);

        let err = add_to_cart(
            &state(db),
            &user,
            AddToCartRequest {
                product_id: book.id,
                count: 5,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_add_is_rejected_before_touching_the_cart() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);
        let err = add_to_cart(
            &state(db),
            &customer(),
            AddToCartRequest {
                product_id: Uuid::new_v4(),
                count: i32::MAX,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn plus_increments_the_line() {
        let user = customer();
        let book = product("Dark Skies", 3_000, 2_500, 2_000);
        let current = line(user.user_id, &book, 2);
        let mut bumped = current.clone();
        bumped.count = 3;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![current.clone()]])
            .append_query_results([vec![bumped.clone()]])
            .append_query_results([vec![(bumped, book)]]);

        let view = plus(&state(db), &user, current.id).await.unwrap().data.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].count, 3);
        assert_eq!(view.order_total, 9_000);
    }

    #[tokio::test]
    async fn plus_on_a_full_line_is_rejected() {
        let user = customer();
        let book = product("Dark Skies", 3_000, 2_500, 2_000);
        let full = line(user.user_id, &book, MAX_LINE_COUNT);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![full.clone()]]);

        let err = plus(&state(db), &user, full.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn minus_decrements_the_line() {
        let user = customer();
        let book = product("Dark Skies", 3_000, 2_500, 2_000);
        let current = line(user.user_id, &book, 3);
        let mut lowered = current.clone();
        lowered.count = 2;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![current.clone()]])
            .append_query_results([vec![lowered.clone()]])
            .append_query_results([vec![(lowered, book)]]);

        let view = minus(&state(db), &user, current.id).await.unwrap().data.unwrap();
        assert_eq!(view.lines[0].count, 2);
        assert_eq!(view.order_total, 6_000);
    }

    #[tokio::test]
    async fn minus_on_last_copy_removes_the_line() {
        let user = customer();
        let book = product("Dark Skies", 3_000, 2_500, 2_000);
        let last = line(user.user_id, &book, 1);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![last.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![audit_row(user.user_id)]])
            .append_query_results([Vec::<(CartModel, ProductModel)>::new()]);
        let state = state(db);

        let view = minus(&state, &user, last.id).await.unwrap().data.unwrap();
        assert!(view.lines.is_empty());
        assert_eq!(view.order_total, 0);

        let log = format!("{:?}", state.orm.into_transaction_log());
        assert!(log.contains("DELETE FROM"));
    }

    #[tokio::test]
    async fn removing_someone_elses_line_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]);

        let err = remove(&state(db), &customer(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn missing_line_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<CartModel>::new()]);

        let err = minus(&state(db), &customer(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn cart_total_uses_tier_prices() {
        let user_id = Uuid::new_v4();
        let cheap = product("Dark Skies", 3_000, 2_500, 2_300);
        let bulk = product("Cotton Candy", 6_500, 6_000, 5_500);

        let view = build_cart_view(vec![
            (line(user_id, &cheap, 2), cheap.clone()),
            (line(user_id, &bulk, 120), bulk.clone()),
        ]);

        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].unit_price, 3_000);
        assert_eq!(view.lines[0].line_total, 6_000);
        assert_eq!(view.lines[1].unit_price, 5_500);
        assert_eq!(view.lines[1].line_total, 660_000);
        assert_eq!(view.order_total, 666_000);
    }

    #[test]
    fn empty_cart_totals_zero() {
        let view = build_cart_view(Vec::new());
        assert!(view.lines.is_empty());
        assert_eq!(view.order_total, 0);
    }
}
