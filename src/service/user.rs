use sqlx::MySqlPool;

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::model::role::Role;
use crate::model::user::{USER_COLUMNS, UserRecord};
use crate::models::{PasswordChangeRequest, TeamMemberResponse, UpdateProfileRequest};

pub async fn get_by_email(pool: &MySqlPool, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await
}

pub async fn get_by_id(pool: &MySqlPool, id: u64) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_role(
    pool: &MySqlPool,
    role: Option<Role>,
) -> Result<Vec<UserRecord>, sqlx::Error> {
    match role {
        Some(role) => {
            sqlx::query_as::<_, UserRecord>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE role_id = ? ORDER BY id"
            ))
            .bind(role.id())
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, UserRecord>(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY id"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

/// Name fields update only when present and non-blank; department only ever
/// applies to employees. Role is untouched here — profile updates can never
/// escalate.
pub async fn update_profile(
    pool: &MySqlPool,
    email: &str,
    req: &UpdateProfileRequest,
) -> Result<UserRecord, ApiError> {
    let user = get_by_email(pool, email)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with email: {email}")))?;

    let first_name = match req.first_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => user.first_name.clone(),
    };
    let last_name = match req.last_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => user.last_name.clone(),
    };
    let department = if user.role() == Some(Role::Employee) && req.department.is_some() {
        req.department.clone()
    } else {
        user.department.clone()
    };

    sqlx::query("UPDATE users SET first_name = ?, last_name = ?, department = ? WHERE id = ?")
        .bind(&first_name)
        .bind(&last_name)
        .bind(&department)
        .bind(user.id)
        .execute(pool)
        .await?;

    get_by_id(pool, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

pub async fn change_password(
    pool: &MySqlPool,
    email: &str,
    req: &PasswordChangeRequest,
) -> Result<(), ApiError> {
    let user = get_by_email(pool, email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if verify_password(&req.old_password, &user.password).is_err() {
        return Err(ApiError::InvalidRequest("Old password is incorrect".into()));
    }

    if req.new_password != req.confirm_password {
        return Err(ApiError::InvalidRequest(
            "New password and confirm password do not match".into(),
        ));
    }

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(hash_password(&req.new_password))
        .bind(user.id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_active(pool: &MySqlPool, id: u64, active: bool) -> Result<UserRecord, ApiError> {
    let affected = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(ApiError::NotFound(format!("User not found with ID: {id}")));
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {id}")))
}

/// Employees reporting to `manager_id`, each row joined with the manager's
/// display name.
pub async fn employees_of_manager(
    pool: &MySqlPool,
    manager_id: u64,
) -> Result<Vec<TeamMemberResponse>, sqlx::Error> {
    sqlx::query_as::<_, TeamMemberResponse>(
        r#"
        SELECT
            e.id, e.email, e.first_name, e.last_name, e.employee_code,
            e.department, e.is_active, e.is_verified, e.created_at, e.updated_at,
            e.manager_id,
            CONCAT_WS(' ', m.first_name, m.last_name) AS manager_name
        FROM users e
        LEFT JOIN users m ON m.id = e.manager_id
        WHERE e.manager_id = ? AND e.role_id = ?
        ORDER BY e.id
        "#,
    )
    .bind(manager_id)
    .bind(Role::Employee.id())
    .fetch_all(pool)
    .await
}
