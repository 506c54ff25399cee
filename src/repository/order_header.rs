use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    entity::{
        order_details::{Column as DetailCol, Entity as OrderDetails, Model as OrderDetailModel},
        order_headers::{ActiveModel as HeaderActive, Column as HeaderCol, Entity as OrderHeaders, Model as HeaderModel},
        products::{Entity as Products, Model as ProductModel},
    },
    error::AppResult,
    status::{OrderListFilter, OrderStatus, PaymentStatus},
};

pub async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Option<HeaderModel>> {
    Ok(OrderHeaders::find_by_id(id).one(conn).await?)
}

/// Row-locking read, for use inside a transaction before a read-then-write.
pub async fn find_for_update<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<HeaderModel>> {
    Ok(OrderHeaders::find_by_id(id)
        .lock(LockType::Update)
        .one(conn)
        .await?)
}

/// Looks an order up as seen by `owner`; `None` means no ownership restriction.
pub async fn find_visible<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    owner: Option<Uuid>,
) -> AppResult<Option<HeaderModel>> {
    let mut condition = Condition::all().add(HeaderCol::Id.eq(id));
    if let Some(user_id) = owner {
        condition = condition.add(HeaderCol::UserId.eq(user_id));
    }
    Ok(OrderHeaders::find().filter(condition).one(conn).await?)
}

fn filter_condition(filter: OrderListFilter, owner: Option<Uuid>) -> Condition {
    let mut condition = Condition::all();
    if let Some(user_id) = owner {
        condition = condition.add(HeaderCol::UserId.eq(user_id));
    }
    match filter {
        OrderListFilter::Pending => {
            condition.add(HeaderCol::PaymentStatus.eq(PaymentStatus::DelayedPayment))
        }
        OrderListFilter::InProcess => {
            condition.add(HeaderCol::OrderStatus.eq(OrderStatus::InProcess))
        }
        OrderListFilter::Completed => {
            condition.add(HeaderCol::OrderStatus.eq(OrderStatus::Shipped))
        }
        OrderListFilter::Approved => {
            condition.add(HeaderCol::OrderStatus.eq(OrderStatus::Approved))
        }
        OrderListFilter::All => condition,
    }
}

pub async fn list<C: ConnectionTrait>(
    conn: &C,
    filter: OrderListFilter,
    owner: Option<Uuid>,
    limit: u64,
    offset: u64,
) -> AppResult<(Vec<HeaderModel>, u64)> {
    let finder = OrderHeaders::find()
        .filter(filter_condition(filter, owner))
        .order_by_desc(HeaderCol::OrderDate);

    let total = finder.clone().count(conn).await?;
    let items = finder.limit(limit).offset(offset).all(conn).await?;
    Ok((items, total))
}

pub async fn details_with_products<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> AppResult<Vec<(OrderDetailModel, Option<ProductModel>)>> {
    Ok(OrderDetails::find()
        .filter(DetailCol::OrderHeaderId.eq(order_id))
        .find_also_related(Products)
        .all(conn)
        .await?)
}

/// Sets the order status and, when given, the payment status.
/// Returns `None` (and changes nothing) when the order does not exist.
pub async fn update_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    order_status: OrderStatus,
    payment_status: Option<PaymentStatus>,
) -> AppResult<Option<HeaderModel>> {
    let Some(order) = OrderHeaders::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };

    let mut active: HeaderActive = order.into();
    active.order_status = Set(order_status);
    if let Some(payment_status) = payment_status {
        active.payment_status = Set(payment_status);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(Some(active.update(conn).await?))
}

/// Records gateway correlation ids. A non-empty payment intent also stamps the
/// payment date. Returns `None` when the order does not exist.
pub async fn update_payment_ids<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    session_id: Option<&str>,
    payment_intent_id: Option<&str>,
) -> AppResult<Option<HeaderModel>> {
    let Some(order) = OrderHeaders::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };

    let mut active: HeaderActive = order.into();
    if let Some(session_id) = session_id.filter(|s| !s.is_empty()) {
        active.session_id = Set(Some(session_id.to_string()));
    }
    if let Some(intent) = payment_intent_id.filter(|s| !s.is_empty()) {
        active.payment_intent_id = Set(Some(intent.to_string()));
        active.payment_date = Set(Some(Utc::now().into()));
    }
    active.updated_at = Set(Utc::now().into());
    Ok(Some(active.update(conn).await?))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::{
        entity::order_headers::Model,
        status::{OrderStatus, PaymentStatus},
    };

    pub fn order(order_status: OrderStatus, payment_status: PaymentStatus) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_date: now.into(),
            shipping_date: None,
            order_total: 10_050,
            order_status,
            payment_status,
            tracking_number: None,
            carrier: None,
            payment_date: None,
            payment_due_date: None,
            session_id: None,
            payment_intent_id: None,
            name: "Test User".into(),
            phone_number: "1234567890".into(),
            street_address: "123 Test St".into(),
            city: "Testville".into(),
            state: "TS".into(),
            postal_code: "12345".into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}
