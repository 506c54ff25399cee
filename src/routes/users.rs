use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::users::{ChangeRoleRequest, RoleManagement, UserList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, OperationResult},
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}/role", get(role_management).put(change_role))
        .route("/{id}/lock", post(lock_unlock))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Users with role and company", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with selectable roles and companies", body = ApiResponse<RoleManagement>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn role_management(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<RoleManagement>>> {
    let resp = user_service::role_management(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed (or unchanged)", body = ApiResponse<User>),
        (status = 400, description = "Company role without a valid company"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn change_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeRoleRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::change_role(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/lock",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Lock toggled; success=false for unknown users", body = ApiResponse<OperationResult>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn lock_unlock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OperationResult>>> {
    let resp = user_service::lock_unlock(&state, &user, id).await?;
    Ok(Json(resp))
}
