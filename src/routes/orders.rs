use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        OrderList, OrderWithDetails, PaymentRedirect, ShipOrderRequest, UpdateOrderDetailRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderHeader,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
    status::OrderListFilter,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(order_details).put(update_order_detail))
        .route("/{id}/start-processing", post(start_processing))
        .route("/{id}/ship", post(ship_order))
        .route("/{id}/cancel", post(cancel_order))
        .route("/{id}/pay-now", post(pay_now))
        .route("/{id}/payment-confirmation", get(payment_confirmation))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "pending, inprocess, completed, approved or all")
    ),
    responses(
        (status = 200, description = "Staff see every order, other users their own", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let (page, per_page, _) = query.pagination.normalize();
    let filter = OrderListFilter::parse(query.status.as_deref());
    let resp = order_service::list_orders(&state, &user, filter, page, per_page).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order header with its lines", body = ApiResponse<OrderWithDetails>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_details(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithDetails>>> {
    let resp = order_service::order_details(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderDetailRequest,
    responses(
        (status = 200, description = "Shipping contact updated", body = ApiResponse<OrderHeader>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_order_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderDetailRequest>,
) -> AppResult<Json<ApiResponse<OrderHeader>>> {
    let resp = order_service::update_order_detail(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/start-processing",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order moved to Processing", body = ApiResponse<OrderHeader>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Status does not allow processing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn start_processing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderHeader>>> {
    let resp = order_service::start_processing(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/ship",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ShipOrderRequest,
    responses(
        (status = 200, description = "Order shipped", body = ApiResponse<OrderHeader>),
        (status = 400, description = "Carrier or tracking number missing"),
        (status = 409, description = "Status does not allow shipping"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn ship_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShipOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderHeader>>> {
    let resp = order_service::ship_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled, captured payment refunded", body = ApiResponse<OrderHeader>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Order already shipped or closed"),
        (status = 502, description = "Refund failed at the gateway"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderHeader>>> {
    let resp = order_service::cancel_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders/{id}/pay-now",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Gateway session for a delayed payment", body = ApiResponse<PaymentRedirect>),
        (status = 409, description = "Order is not awaiting a delayed payment"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn pay_now(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentRedirect>>> {
    let resp = order_service::pay_now(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}/payment-confirmation",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order after delayed payment confirmation", body = ApiResponse<OrderHeader>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn payment_confirmation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderHeader>>> {
    let resp = order_service::payment_confirmation(&state, &user, id).await?;
    Ok(Json(resp))
}
