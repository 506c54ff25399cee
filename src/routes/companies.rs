use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{CompanyList, CompanyRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::Company,
    response::ApiResponse,
    services::company_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route(
            "/{id}",
            get(get_company).put(update_company).delete(delete_company),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/companies",
    responses(
        (status = 200, description = "Companies", body = ApiResponse<CompanyList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn list_companies(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CompanyList>>> {
    ensure_admin(&user)?;
    let resp = company_service::list_companies(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company", body = ApiResponse<Company>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn get_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Company>>> {
    ensure_admin(&user)?;
    let resp = company_service::get_company(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/companies",
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "Company created", body = ApiResponse<Company>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn create_company(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CompanyRequest>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let resp = company_service::create_company(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    request_body = CompanyRequest,
    responses(
        (status = 200, description = "Company updated", body = ApiResponse<Company>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn update_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyRequest>,
) -> AppResult<Json<ApiResponse<Company>>> {
    let resp = company_service::update_company(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/companies/{id}",
    params(("id" = Uuid, Path, description = "Company ID")),
    responses(
        (status = 200, description = "Company deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Companies"
)]
pub async fn delete_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = company_service::delete_company(&state, &user, id).await?;
    Ok(Json(resp))
}
