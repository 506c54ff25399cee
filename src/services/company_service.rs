use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CompanyList, CompanyRequest},
    entity::companies::{ActiveModel, Column, Entity as Companies},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Company,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_companies(state: &AppState) -> AppResult<ApiResponse<CompanyList>> {
    let items: Vec<Company> = Companies::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Company::from)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Companies",
        CompanyList { items },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub async fn get_company(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Company>> {
    let company = Companies::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Company", company.into(), None))
}

pub async fn create_company(
    state: &AppState,
    user: &AuthUser,
    payload: CompanyRequest,
) -> AppResult<ApiResponse<Company>> {
    ensure_admin(user)?;
    payload.validate()?;

    let company = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        street_address: Set(payload.street_address),
        city: Set(payload.city),
        state: Set(payload.state),
        postal_code: Set(payload.postal_code),
        phone_number: Set(payload.phone_number),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "company_create",
        "companies",
        serde_json::json!({ "company_id": company.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Company created successfully",
        company.into(),
        Some(Meta::empty()),
    ))
}

pub async fn update_company(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CompanyRequest,
) -> AppResult<ApiResponse<Company>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Companies::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(payload.name.trim().to_string());
    active.street_address = Set(payload.street_address);
    active.city = Set(payload.city);
    active.state = Set(payload.state);
    active.postal_code = Set(payload.postal_code);
    active.phone_number = Set(payload.phone_number);
    let company = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "company_update",
        "companies",
        serde_json::json!({ "company_id": company.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Company updated successfully",
        company.into(),
        Some(Meta::empty()),
    ))
}

/// Users of a deleted company keep their account; the link is cleared by the database.
pub async fn delete_company(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Companies::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "company_delete",
        "companies",
        serde_json::json!({ "company_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Company deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
