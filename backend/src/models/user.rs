use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::UserStatus;
use sqlx::FromRow;

use super::{MovementDetail, UserMovement};

/// Role given to the user created at company registration
pub const ADMIN_ROLE: &str = "Administrador";

/// Role given to users created without an explicit one
pub const DEFAULT_ROLE: &str = "Usuário";

/// Column list shared by every query returning [`User`]
pub const USER_COLUMNS: &str = "id, company_id, name, email, password_hash, phone, role, status, \
     withdrawn_units, last_activity_at, created_at, updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: String,
    #[sqlx(try_from = "String")]
    pub status: UserStatus,
    /// Units removed from stock through exit movements
    pub withdrawn_units: i32,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User profile together with the movements they performed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithMovements {
    #[serde(flatten)]
    pub user: User,
    pub movements: Vec<MovementDetail>,
}

/// User row of the listing with the movements they performed, newest first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListItem {
    #[serde(flatten)]
    pub user: User,
    pub movements: Vec<UserMovement>,
}
