use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        products::{Entity as Products, Model as ProductModel},
        shopping_carts::{Column as CartCol, Entity as ShoppingCarts, Model as CartModel},
    },
    error::AppResult,
};

/// Cart lines of one user, each with its product.
pub async fn lines_with_products<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Vec<(CartModel, ProductModel)>> {
    let rows = ShoppingCarts::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .find_also_related(Products)
        .all(conn)
        .await?;

    // product_id is a foreign key, a missing product cannot happen
    Ok(rows
        .into_iter()
        .filter_map(|(line, product)| product.map(|p| (line, p)))
        .collect())
}

pub async fn find_line<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    cart_id: Uuid,
) -> AppResult<Option<CartModel>> {
    Ok(ShoppingCarts::find_by_id(cart_id)
        .filter(CartCol::UserId.eq(user_id))
        .one(conn)
        .await?)
}

pub async fn clear<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<u64> {
    let result = ShoppingCarts::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
