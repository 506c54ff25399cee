use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::users::{ChangeRoleRequest, RoleManagement, UserList, UserSummary},
    entity::{
        companies::{Column as CompanyCol, Entity as Companies},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Company, User},
    response::{ApiResponse, Meta, OperationResult},
    state::AppState,
    status::Role,
};

/// How long a "locked" account stays locked; effectively forever.
const LOCKOUT_YEARS: i64 = 1000;

/// Role and company link after a role change, or `None` when the role is unchanged.
pub(crate) fn plan_role_change(
    current: Role,
    current_company: Option<Uuid>,
    requested: Role,
    requested_company: Option<Uuid>,
) -> AppResult<Option<(Role, Option<Uuid>)>> {
    if current == requested {
        return Ok(None);
    }

    let company_id = match requested {
        Role::Company => Some(requested_company.ok_or_else(|| {
            AppError::Validation("company_id is required for the Company role".into())
        })?),
        _ if current == Role::Company => None,
        _ => current_company,
    };
    Ok(Some((requested, company_id)))
}

/// New lockout end: a currently locked account is released, anything else is locked.
pub(crate) fn toggled_lockout(
    lockout_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match lockout_end {
        Some(end) if end > now => now,
        _ => now + Duration::days(365 * LOCKOUT_YEARS),
    }
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let now = Utc::now();

    let items: Vec<UserSummary> = Users::find()
        .order_by_asc(UserCol::Email)
        .find_also_related(Companies)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(u, company)| {
            let lockout_end = u.lockout_end.map(|dt| dt.with_timezone(&Utc));
            UserSummary {
                id: u.id,
                email: u.email,
                name: u.name,
                phone_number: u.phone_number,
                role: u.role,
                company_name: company.map(|c| c.name).unwrap_or_default(),
                locked: lockout_end.is_some_and(|end| end > now),
                lockout_end,
            }
        })
        .collect();

    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

pub async fn role_management(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<RoleManagement>> {
    ensure_admin(user)?;

    let target = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let companies = Companies::find()
        .order_by_asc(CompanyCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Company::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        RoleManagement {
            user: target.into(),
            roles: [Role::Customer, Role::Company, Role::Admin, Role::Employee].to_vec(),
            companies,
        },
        Some(Meta::empty()),
    ))
}

pub async fn change_role(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    payload: ChangeRoleRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let target = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let Some((role, company_id)) =
        plan_role_change(target.role, target.company_id, payload.role, payload.company_id)?
    else {
        return Ok(ApiResponse::success("Role unchanged", target.into(), None));
    };

    if let Some(company_id) = company_id {
        if Companies::find_by_id(company_id).one(&state.orm).await?.is_none() {
            return Err(AppError::BadRequest("company not found".into()));
        }
    }

    let previous = target.role;
    let mut active: UserActive = target.into();
    active.role = Set(role);
    active.company_id = Set(company_id);
    let updated = active.update(&state.orm).await?;

    tracing::info!(
        user_id = %updated.id,
        from = previous.as_str(),
        to = role.as_str(),
        "user role changed"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "user_role_change",
        "users",
        serde_json::json!({ "user_id": updated.id, "from": previous.as_str(), "to": role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success("Role updated", updated.into(), None))
}

pub async fn lock_unlock(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<OperationResult>> {
    ensure_admin(user)?;

    let Some(target) = Users::find_by_id(user_id).one(&state.orm).await? else {
        return Ok(ApiResponse::success(
            "Lock/unlock",
            OperationResult::failed("Error while Locking/Unlocking"),
            None,
        ));
    };

    let now = Utc::now();
    let current = target.lockout_end.map(|dt| dt.with_timezone(&Utc));
    let lockout_end = toggled_lockout(current, now);

    let mut active: UserActive = target.into();
    active.lockout_end = Set(Some(lockout_end.into()));
    active.update(&state.orm).await?;

    let locked = lockout_end > now;
    tracing::info!(user_id = %user_id, locked, "user lockout toggled");
    audit::record(
        &state.orm,
        user.user_id,
        if locked { "user_lock" } else { "user_unlock" },
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Lock/unlock",
        OperationResult::ok("Operation Successful"),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_role_is_a_no_op() {
        let company = Some(Uuid::new_v4());
        assert!(
            plan_role_change(Role::Company, company, Role::Company, None)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn moving_to_company_requires_and_sets_company() {
        let company = Uuid::new_v4();
        assert_eq!(
            plan_role_change(Role::Customer, None, Role::Company, Some(company)).unwrap(),
            Some((Role::Company, Some(company)))
        );
        assert!(matches!(
            plan_role_change(Role::Customer, None, Role::Company, None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn leaving_company_clears_link() {
        assert_eq!(
            plan_role_change(Role::Company, Some(Uuid::new_v4()), Role::Employee, None).unwrap(),
            Some((Role::Employee, None))
        );
    }

    #[test]
    fn lock_toggle() {
        let now = Utc::now();
        // never locked -> locked far in the future
        let locked = toggled_lockout(None, now);
        assert!(locked > now + Duration::days(365 * 999));
        // currently locked -> released now
        assert_eq!(toggled_lockout(Some(locked), now), now);
        // expired lock -> locked again
        let expired = now - Duration::days(1);
        assert!(toggled_lockout(Some(expired), now) > now);
    }
}
