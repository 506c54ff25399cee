use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{
        OrderList, OrderWithDetails, PaymentRedirect, ShipOrderRequest, UpdateOrderDetailRequest,
    },
    entity::order_headers::{ActiveModel as HeaderActive, Model as HeaderModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{OrderDetail, OrderHeader},
    payment::{CheckoutSessionRequest, SessionLineItem},
    repository::order_header,
    response::{ApiResponse, Meta},
    services::checkout_service::approve_if_paid,
    state::AppState,
    status::{OrderListFilter, OrderStatus, PaymentStatus},
};

/// Delayed (company) payments fall due this many days after shipping.
pub const PAYMENT_TERM_DAYS: i64 = 30;

fn guard_transition(order: &HeaderModel, next: OrderStatus) -> AppResult<()> {
    if !order.order_status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "order is {} and cannot become {}",
            order.order_status.as_str(),
            next.as_str()
        )));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Staff see every order; everyone else only their own.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    filter: OrderListFilter,
    page: i64,
    per_page: i64,
) -> AppResult<ApiResponse<OrderList>> {
    let offset = (page - 1).max(0) * per_page;

    let (orders, total) = order_header::list(
        &state.orm,
        filter,
        user.order_owner(),
        per_page as u64,
        offset as u64,
    )
    .await?;

    let meta = Meta::new(page, per_page, total as i64);
    Ok(ApiResponse::success(
        "Ok",
        OrderList {
            items: orders.into_iter().map(OrderHeader::from).collect(),
        },
        Some(meta),
    ))
}

pub async fn order_details(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithDetails>> {
    let order = order_header::find_visible(&state.orm, id, user.order_owner())
        .await?
        .ok_or(AppError::NotFound)?;

    let details = order_header::details_with_products(&state.orm, order.id)
        .await?
        .into_iter()
        .map(|(detail, product)| OrderDetail::with_product(detail, product))
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithDetails {
            order: order.into(),
            details,
        },
        Some(Meta::empty()),
    ))
}

/// Corrects the shipping contact; carrier and tracking are only overwritten
/// when a non-empty value is supplied.
pub async fn update_order_detail(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderDetailRequest,
) -> AppResult<ApiResponse<OrderHeader>> {
    ensure_staff(user)?;

    let txn = state.orm.begin().await?;
    let order = order_header::find_for_update(&txn, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: HeaderActive = order.into();
    active.name = Set(payload.name);
    active.phone_number = Set(payload.phone_number);
    active.street_address = Set(payload.street_address);
    active.city = Set(payload.city);
    active.state = Set(payload.state);
    active.postal_code = Set(payload.postal_code);
    if let Some(carrier) = non_empty(payload.carrier) {
        active.carrier = Set(Some(carrier));
    }
    if let Some(tracking) = non_empty(payload.tracking_number) {
        active.tracking_number = Set(Some(tracking));
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "order_details_updated",
        "order_headers",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order Details Updated Successfully.",
        order.into(),
        Some(Meta::empty()),
    ))
}

pub async fn start_processing(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderHeader>> {
    ensure_staff(user)?;

    let txn = state.orm.begin().await?;
    let order = order_header::find_for_update(&txn, id)
        .await?
        .ok_or(AppError::NotFound)?;
    guard_transition(&order, OrderStatus::InProcess)?;

    let order = order_header::update_status(&txn, id, OrderStatus::InProcess, None)
        .await?
        .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    tracing::info!(order_id = %id, "order processing started");
    audit::record(
        &state.orm,
        user.user_id,
        "order_processing",
        "order_headers",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order Details Updated Successfully.",
        order.into(),
        Some(Meta::empty()),
    ))
}

pub async fn ship_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ShipOrderRequest,
) -> AppResult<ApiResponse<OrderHeader>> {
    ensure_staff(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let order = order_header::find_for_update(&txn, id)
        .await?
        .ok_or(AppError::NotFound)?;
    guard_transition(&order, OrderStatus::Shipped)?;

    let now = Utc::now();
    let delayed = order.payment_status.is_delayed();
    let mut active: HeaderActive = order.into();
    active.carrier = Set(Some(payload.carrier.trim().to_string()));
    active.tracking_number = Set(Some(payload.tracking_number.trim().to_string()));
    active.order_status = Set(OrderStatus::Shipped);
    active.shipping_date = Set(Some(now.into()));
    if delayed {
        active.payment_due_date = Set(Some((now + Duration::days(PAYMENT_TERM_DAYS)).into()));
    }
    active.updated_at = Set(now.into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = %id, carrier = %payload.carrier, delayed, "order shipped");
    audit::record(
        &state.orm,
        user.user_id,
        "order_shipped",
        "order_headers",
        serde_json::json!({ "order_id": id, "tracking_number": payload.tracking_number }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order Shipped Successfully.",
        order.into(),
        Some(Meta::empty()),
    ))
}

/// Cancels an order. A captured payment is refunded at the gateway first; the
/// header row stays locked until the new statuses are committed.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderHeader>> {
    ensure_staff(user)?;

    let txn = state.orm.begin().await?;
    let order = order_header::find_for_update(&txn, id)
        .await?
        .ok_or(AppError::NotFound)?;
    guard_transition(&order, OrderStatus::Cancelled)?;

    let payment_status = if order.payment_status == PaymentStatus::Approved {
        let intent = order
            .payment_intent_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::Conflict("approved payment has no payment intent to refund".into())
            })?;
        state.payments.refund(intent).await?;
        PaymentStatus::Refunded
    } else {
        PaymentStatus::Cancelled
    };

    let order = order_header::update_status(&txn, id, OrderStatus::Cancelled, Some(payment_status))
        .await?
        .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    tracing::info!(order_id = %id, payment_status = payment_status.as_str(), "order cancelled");
    audit::record(
        &state.orm,
        user.user_id,
        "order_cancelled",
        "order_headers",
        serde_json::json!({ "order_id": id, "payment_status": payment_status.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order Cancelled Successfully.",
        order.into(),
        Some(Meta::empty()),
    ))
}

/// Opens a gateway session for a company order that was approved for delayed payment.
pub async fn pay_now(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PaymentRedirect>> {
    let order = order_header::find_visible(&state.orm, id, user.order_owner())
        .await?
        .ok_or(AppError::NotFound)?;
    if !order.payment_status.is_delayed() {
        return Err(AppError::Conflict(
            "order is not awaiting a delayed payment".into(),
        ));
    }

    let line_items = order_header::details_with_products(&state.orm, order.id)
        .await?
        .into_iter()
        .map(|(detail, product)| SessionLineItem {
            name: product
                .map(|p| p.title)
                .unwrap_or_else(|| detail.product_id.to_string()),
            unit_amount: detail.price,
            quantity: i64::from(detail.count),
        })
        .collect();

    let session = state
        .payments
        .create_checkout_session(CheckoutSessionRequest {
            order_id: order.id,
            success_url: state.config.payment_confirmation_url(order.id),
            cancel_url: state.config.order_url(order.id),
            currency: state.config.stripe.currency.clone(),
            line_items,
        })
        .await?;

    order_header::update_payment_ids(&state.orm, order.id, Some(&session.id), None).await?;

    Ok(ApiResponse::success(
        "Redirect to payment",
        PaymentRedirect {
            order_id: order.id,
            session_id: session.id,
            payment_url: session.url,
        },
        Some(Meta::empty()),
    ))
}

/// Return point of the delayed-payment session: approves the payment and
/// leaves the order status where it was.
pub async fn payment_confirmation(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderHeader>> {
    let order = order_header::find_visible(&state.orm, id, user.order_owner())
        .await?
        .ok_or(AppError::NotFound)?;

    let order = if order.payment_status.is_delayed() {
        let current = order.order_status;
        approve_if_paid(state, order, current).await?
    } else {
        order
    };

    Ok(ApiResponse::success(
        "Payment confirmation",
        order.into(),
        Some(Meta::empty()),
    ))
}
