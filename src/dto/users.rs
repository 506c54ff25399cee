use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Company, User},
    status::Role,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    /// Empty when the user is not attached to a company.
    pub company_name: String,
    pub lockout_end: Option<DateTime<Utc>>,
    pub locked: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<UserSummary>)]
    pub items: Vec<UserSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleManagement {
    pub user: User,
    pub roles: Vec<Role>,
    pub companies: Vec<Company>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: Role,
    pub company_id: Option<Uuid>,
}
