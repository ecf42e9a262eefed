use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

/// Column list matching [`UserRecord`]; keep in sync with the SELECTs in
/// the stores and handlers.
pub const USER_COLUMNS: &str = "id, email, password, role_id, first_name, last_name, \
     manager_id, employee_code, department, is_active, is_verified, created_at, updated_at";

/// One row of the `users` table. The Admin/Manager/Employee hierarchy is a
/// single record carrying a role discriminant plus role-specific nullable
/// columns: `manager_id`, `employee_code` and `department` are only set for
/// employees.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub role_id: u8,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub manager_id: Option<u64>,
    pub employee_code: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Public-safe projection of a user: everything a caller may see, never the
/// password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "jane@company.com", format = "email", value_type = String)]
    pub email: String,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub manager_id: Option<u64>,
    #[schema(example = "EMP4F7A2C9B")]
    pub employee_code: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        UserResponse {
            role: user.role(),
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            manager_id: user.manager_id,
            employee_code: user.employee_code,
            department: user.department,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        UserRecord {
            id: 7,
            email: "jane@company.com".into(),
            password: "$argon2id$fake".into(),
            role_id: Role::Manager.id(),
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            manager_id: None,
            employee_code: None,
            department: None,
            is_active: true,
            is_verified: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn projection_drops_password() {
        let resp = UserResponse::from(record());
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "MANAGER");
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let mut user = record();
        user.last_name = None;
        assert_eq!(user.full_name(), "Jane");
    }
}
