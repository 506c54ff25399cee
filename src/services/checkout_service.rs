//! Order placement and the customer-side payment confirmation.
//!
//! Regular customers pay up front through a hosted gateway session; company
//! accounts are approved straight away and pay later ("delayed payment").

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{PlacedOrder, ShippingDetails},
    entity::{
        order_details::ActiveModel as DetailActive,
        order_headers::{ActiveModel as HeaderActive, Model as HeaderModel},
        products::Model as ProductModel,
        shopping_carts::Model as CartModel,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::OrderHeader,
    payment::{CheckoutSessionRequest, SessionLineItem},
    pricing,
    repository::{order_header, shopping_cart},
    response::{ApiResponse, Meta},
    state::AppState,
    status::{OrderStatus, PaymentStatus},
};

/// Initial statuses for a new order: company accounts skip up-front payment.
pub(crate) fn initial_statuses(company_id: Option<Uuid>) -> (OrderStatus, PaymentStatus) {
    match company_id {
        Some(_) => (OrderStatus::Approved, PaymentStatus::DelayedPayment),
        None => (OrderStatus::Pending, PaymentStatus::Pending),
    }
}

pub(crate) fn session_line_items(rows: &[(CartModel, ProductModel)]) -> Vec<SessionLineItem> {
    rows.iter()
        .map(|(line, product)| SessionLineItem {
            name: product.title.clone(),
            unit_amount: pricing::price_for_quantity(product, line.count),
            quantity: i64::from(line.count),
        })
        .collect()
}

pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    shipping: ShippingDetails,
) -> AppResult<ApiResponse<PlacedOrder>> {
    shipping.validate()?;

    let profile = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let txn = state.orm.begin().await?;

    let rows = shopping_cart::lines_with_products(&txn, user.user_id).await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let order_total: i64 = rows
        .iter()
        .map(|(line, product)| pricing::line_total(product, line.count))
        .sum();
    let (order_status, payment_status) = initial_statuses(profile.company_id);
    let now = Utc::now();

    let order = HeaderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        order_date: Set(now.into()),
        shipping_date: Set(None),
        order_total: Set(order_total),
        order_status: Set(order_status),
        payment_status: Set(payment_status),
        tracking_number: Set(None),
        carrier: Set(None),
        payment_date: Set(None),
        payment_due_date: Set(None),
        session_id: Set(None),
        payment_intent_id: Set(None),
        name: Set(shipping.name.trim().to_string()),
        phone_number: Set(shipping.phone_number.trim().to_string()),
        street_address: Set(shipping.street_address.trim().to_string()),
        city: Set(shipping.city.trim().to_string()),
        state: Set(shipping.state.trim().to_string()),
        postal_code: Set(shipping.postal_code.trim().to_string()),
        created_at: NotSet,
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    for (line, product) in &rows {
        DetailActive {
            id: Set(Uuid::new_v4()),
            order_header_id: Set(order.id),
            product_id: Set(product.id),
            count: Set(line.count),
            price: Set(pricing::price_for_quantity(product, line.count)),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    // company orders need no payment round-trip, so the cart is done now
    if payment_status.is_delayed() {
        shopping_cart::clear(&txn, user.user_id).await?;
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        order_total,
        order_status = order_status.as_str(),
        "order placed"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "order_placed",
        "order_headers",
        serde_json::json!({ "order_id": order.id, "order_total": order_total }),
    )
    .await;

    if payment_status.is_delayed() {
        return Ok(ApiResponse::success(
            "Order placed",
            PlacedOrder {
                order: order.into(),
                payment_url: None,
            },
            Some(Meta::empty()),
        ));
    }

    let session = state
        .payments
        .create_checkout_session(CheckoutSessionRequest {
            order_id: order.id,
            success_url: state.config.confirmation_url(order.id),
            cancel_url: state.config.cart_url(),
            currency: state.config.stripe.currency.clone(),
            line_items: session_line_items(&rows),
        })
        .await?;

    let order = order_header::update_payment_ids(&state.orm, order.id, Some(&session.id), None)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Order placed",
        PlacedOrder {
            order: order.into(),
            payment_url: session.url,
        },
        Some(Meta::empty()),
    ))
}

/// Landing point after the hosted payment page. Approves the order when the
/// gateway reports the session paid, then empties the cart.
pub async fn confirm_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderHeader>> {
    let order = order_header::find_visible(&state.orm, order_id, Some(user.user_id))
        .await?
        .ok_or(AppError::NotFound)?;

    let order = if order.payment_status.is_delayed() {
        order
    } else {
        approve_if_paid(state, order, OrderStatus::Approved).await?
    };

    let cleared = shopping_cart::clear(&state.orm, user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, cleared, "cart cleared after checkout");

    Ok(ApiResponse::success(
        "Order confirmation",
        order.into(),
        Some(Meta::empty()),
    ))
}

/// Re-reads the order's gateway session and, when it is paid, records the
/// correlation ids and approves the payment, moving the order to `order_status`.
pub(crate) async fn approve_if_paid(
    state: &AppState,
    order: HeaderModel,
    order_status: OrderStatus,
) -> AppResult<HeaderModel> {
    let Some(session_id) = order.session_id.clone().filter(|s| !s.is_empty()) else {
        tracing::warn!(order_id = %order.id, "order has no payment session to confirm");
        return Ok(order);
    };

    let session = state.payments.retrieve_session(&session_id).await?;
    if !session.is_paid() {
        tracing::info!(
            order_id = %order.id,
            payment_status = %session.payment_status,
            "payment session not paid yet"
        );
        return Ok(order);
    }

    let txn = state.orm.begin().await?;
    let current = order_header::find_for_update(&txn, order.id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !current.order_status.can_transition_to(order_status) {
        tracing::warn!(
            order_id = %order.id,
            from = current.order_status.as_str(),
            to = order_status.as_str(),
            "paid session for an order that can no longer be approved"
        );
        return Ok(current);
    }

    order_header::update_payment_ids(
        &txn,
        order.id,
        Some(&session.id),
        session.payment_intent.as_deref(),
    )
    .await?;
    let updated = order_header::update_status(
        &txn,
        order.id,
        order_status,
        Some(PaymentStatus::Approved),
    )
    .await?
    .ok_or(AppError::NotFound)?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, session_id = %session.id, "payment approved");
    audit::record(
        &state.orm,
        order.user_id,
        "payment_approved",
        "order_headers",
        serde_json::json!({ "order_id": order.id, "session_id": session.id }),
    )
    .await;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::{
        config::sample_config,
        entity::{
            audit_logs::Model as AuditModel, order_details::Model as DetailModel,
            users::Model as UserModel,
        },
        payment::{CheckoutSession, mock::MockGateway},
        repository::order_header::fixtures::order,
        services::cart_service::fixtures::{line, product},
        status::Role,
    };

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            name: "Jane".into(),
            phone_number: "555".into(),
            street_address: "1 Main St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            postal_code: "62701".into(),
        }
    }

    fn profile(id: Uuid) -> UserModel {
        UserModel {
            id,
            email: "jane@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Customer,
            name: "Jane".into(),
            street_address: None,
            city: None,
            state: None,
            postal_code: None,
            phone_number: None,
            company_id: None,
            lockout_end: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn card_order_records_the_gateway_session() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
        };
        let book = product("Dark Skies", 3_000, 2_500, 2_000);
        let cart_line = line(user.user_id, &book, 2);

        let mut header = order(OrderStatus::Pending, PaymentStatus::Pending);
        header.user_id = user.user_id;
        header.order_total = 6_000;
        let mut with_session = header.clone();
        with_session.session_id = Some("cs_42".into());
        let detail = DetailModel {
            id: Uuid::new_v4(),
            order_header_id: header.id,
            product_id: book.id,
            count: 2,
            price: 3_000,
            created_at: Utc::now().into(),
        };
        let audit_row = AuditModel {
            id: Uuid::new_v4(),
            user_id: Some(user.user_id),
            action: "order_placed".into(),
            resource: Some("order_headers".into()),
            metadata: None,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user.user_id)]])
            .append_query_results([vec![(cart_line, book)]])
            .append_query_results([vec![header.clone()]])
            .append_query_results([vec![detail]])
            .append_query_results([vec![audit_row]])
            .append_query_results([vec![header.clone()]])
            .append_query_results([vec![with_session]]);

        let config = sample_config();
        let success_url = config.confirmation_url(header.id);
        let mut gateway = MockGateway::new();
        gateway
            .expect_create_checkout_session()
            .times(1)
            .returning(move |request| {
                assert_eq!(request.success_url, success_url);
                assert_eq!(request.line_items.len(), 1);
                assert_eq!(request.line_items[0].unit_amount, 3_000);
                Ok(CheckoutSession {
                    id: "cs_42".into(),
                    url: Some("https://pay.test/cs_42".into()),
                    payment_status: "unpaid".into(),
                    payment_intent: None,
                })
            });
        let state = AppState {
            orm: db.into_connection(),
            config: Arc::new(config),
            payments: Arc::new(gateway),
        };

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let placed = place_order(&state, &user, shipping()).await.unwrap().data.unwrap();
        assert_eq!(placed.order.session_id.as_deref(), Some("cs_42"));
        assert_eq!(placed.order.order_total, 6_000);
        assert_eq!(placed.payment_url.as_deref(), Some("https://pay.test/cs_42"));

        // session creation is logged by the gateway client, not here
        let output = logs.contents();
        assert_eq!(output.matches("order placed").count(), 1);
        assert!(!output.contains("checkout session created"));
    }

    #[tokio::test]
    async fn empty_cart_cannot_be_ordered() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![profile(user.user_id)]])
            .append_query_results([Vec::<(CartModel, ProductModel)>::new()]);

        let mut gateway = MockGateway::new();
        gateway.expect_create_checkout_session().never();
        let state = AppState {
            orm: db.into_connection(),
            config: Arc::new(sample_config()),
            payments: Arc::new(gateway),
        };

        let err = place_order(&state, &user, shipping()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Cart is empty"));
    }

    #[test]
    fn company_accounts_get_delayed_payment() {
        assert_eq!(
            initial_statuses(Some(Uuid::new_v4())),
            (OrderStatus::Approved, PaymentStatus::DelayedPayment)
        );
        assert_eq!(
            initial_statuses(None),
            (OrderStatus::Pending, PaymentStatus::Pending)
        );
    }

    #[test]
    fn session_items_carry_tier_price_and_count() {
        let user_id = Uuid::new_v4();
        let book = product("Rock in the Ocean", 3_500, 3_000, 2_000);
        let items = session_line_items(&[(line(user_id, &book, 60), book.clone())]);
        assert_eq!(
            items,
            vec![SessionLineItem {
                name: "Rock in the Ocean".into(),
                unit_amount: 3_000,
                quantity: 60,
            }]
        );
    }
}
