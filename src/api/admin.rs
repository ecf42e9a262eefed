use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::model::user::UserResponse;
use crate::models::{OtpRequest, PasswordChangeRequest, TeamMemberResponse, UpdateProfileRequest};
use crate::service::{Registration, user};
use crate::utils::db_utils::{build_update_sql, execute_update, filter_allowed};
use crate::utils::{email_cache, email_filter};

/// Columns the admin update endpoint may touch. Everything else in the
/// payload is silently dropped before the UPDATE is built.
const UPDATABLE_USER_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "department",
    "manager_id",
    "role_id",
    "is_active",
];

#[derive(Deserialize, ToSchema)]
pub struct ToggleStatusQuery {
    pub active: bool,
}

/// Initiate Manager Registration
#[utoipa::path(
    post,
    path = "/api/admin/managers/initiate-registration",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "OTP dispatched", body = Object, example = json!({
            "message": "OTP sent to manager's email for registration"
        })),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn initiate_manager_registration(
    auth: AuthUser,
    registration: web::Data<Registration>,
    body: web::Json<OtpRequest>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    info!(admin = %auth.email, invitee = %body.email, "manager registration initiated");

    registration
        .initiate(&body.email, Role::Manager, None)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "OTP sent to manager's email for registration"
    })))
}

/// Initiate Employee Registration
#[utoipa::path(
    post,
    path = "/api/admin/employees/initiate-registration",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "OTP dispatched", body = Object, example = json!({
            "message": "OTP sent to employee's email for registration"
        })),
        (status = 400, description = "Manager ID missing"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn initiate_employee_registration(
    auth: AuthUser,
    registration: web::Data<Registration>,
    body: web::Json<OtpRequest>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;
    info!(admin = %auth.email, invitee = %body.email, "employee registration initiated");

    registration
        .initiate(&body.email, Role::Employee, body.manager_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "OTP sent to employee's email for registration"
    })))
}

/// List Users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, description = "All users", body = [UserResponse])),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_users(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let users = user::list_by_role(pool.get_ref(), None).await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// Get User by ID
#[utoipa::path(
    get,
    path = "/api/admin/users/{user_id}",
    params(("user_id", Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let record = user::get_by_id(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {user_id}")))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(record)))
}

/// Update User (administrative override, including role)
#[utoipa::path(
    put,
    path = "/api/admin/users/{user_id}",
    params(("user_id", Path, description = "User ID")),
    request_body = Object,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let payload = filter_allowed(&body, UPDATABLE_USER_COLUMNS);
    let update = build_update_sql("users", &payload, "id", user_id)?;

    let affected = execute_update(pool.get_ref(), update).await?;
    if affected == 0 {
        return Err(ApiError::NotFound(format!("User not found with ID: {user_id}")));
    }

    let record = user::get_by_id(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {user_id}")))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(record)))
}

/// Delete User
#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}",
    params(("user_id", Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found"),
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();

    let record = user::get_by_id(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found with ID: {user_id}")))?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool.get_ref())
        .await?;

    // the email is free again; keep the fast-path structures honest
    email_filter::remove(&record.email);
    email_cache::mark_available(&record.email).await;

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}

/// Toggle User Active Status
#[utoipa::path(
    put,
    path = "/api/admin/users/{user_id}/toggle-status",
    params(
        ("user_id", Path, description = "User ID"),
        ("active", Query, description = "New active state"),
    ),
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "User not found"),
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn toggle_user_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<ToggleStatusQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let record = user::set_active(pool.get_ref(), user_id, query.active).await?;

    let status = if query.active { "activated" } else { "deactivated" };
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("User {status} successfully"),
        "user": UserResponse::from(record),
    })))
}

/// List Managers
#[utoipa::path(
    get,
    path = "/api/admin/managers",
    responses((status = 200, description = "All managers", body = [UserResponse])),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_managers(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let managers = user::list_by_role(pool.get_ref(), Some(Role::Manager)).await?;
    let managers: Vec<UserResponse> = managers.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(managers))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses((status = 200, description = "All employees", body = [UserResponse])),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let employees = user::list_by_role(pool.get_ref(), Some(Role::Employee)).await?;
    let employees: Vec<UserResponse> = employees.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(employees))
}

/// Employees of a Manager
#[utoipa::path(
    get,
    path = "/api/admin/managers/{manager_id}/employees",
    params(("manager_id", Path, description = "Manager ID")),
    responses((status = 200, description = "Team of the manager", body = [TeamMemberResponse])),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn manager_employees(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let team = user::employees_of_manager(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(team))
}

/// Admin Profile
#[utoipa::path(
    get,
    path = "/api/admin/profile",
    responses((status = 200, description = "Own profile", body = UserResponse)),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let record = user::get_by_email(pool.get_ref(), &auth.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(record)))
}

/// Update Admin Profile
#[utoipa::path(
    put,
    path = "/api/admin/profile",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = UserResponse)),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let record = user::update_profile(pool.get_ref(), &auth.email, &body).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "user": UserResponse::from(record),
    })))
}

/// Change Admin Password
#[utoipa::path(
    post,
    path = "/api/admin/change-password",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Old password incorrect or confirmation mismatch"),
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<PasswordChangeRequest>,
) -> Result<HttpResponse, ApiError> {
    user::change_password(pool.get_ref(), &auth.email, &body).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully" })))
}
