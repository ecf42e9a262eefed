use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::user::{UserRecord, UserResponse};
use crate::models::{PasswordChangeRequest, TeamMemberResponse, UpdateProfileRequest};
use crate::service::user;

async fn current_employee(pool: &MySqlPool, auth: &AuthUser) -> Result<UserRecord, ApiError> {
    if !auth.is_employee() {
        return Err(ApiError::InvalidRequest("User is not an employee".into()));
    }

    user::get_by_email(pool, &auth.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".into()))
}

/// Employee Profile
#[utoipa::path(
    get,
    path = "/api/employees/profile",
    responses((status = 200, description = "Own profile", body = UserResponse)),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let record = user::get_by_email(pool.get_ref(), &auth.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(record)))
}

/// Update Employee Profile
#[utoipa::path(
    put,
    path = "/api/employees/profile",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = UserResponse)),
    tag = "Employee",
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

/// Change Employee Password
#[utoipa::path(
    post,
    path = "/api/employees/change-password",
    request_body = PasswordChangeRequest,
    responses((status = 200, description = "Password changed")),
    tag = "Employee",
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

/// Own Manager
#[utoipa::path(
    get,
    path = "/api/employees/manager",
    responses(
        (status = 200, description = "Manager of the caller", body = UserResponse),
        (status = 404, description = "No manager assigned"),
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_manager(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let employee = current_employee(pool.get_ref(), &auth).await?;

    let manager_id = employee
        .manager_id
        .ok_or_else(|| ApiError::NotFound("No manager assigned".into()))?;

    let manager = user::get_by_id(pool.get_ref(), manager_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No manager assigned".into()))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(manager)))
}

/// Team Mates (other employees under the same manager)
#[utoipa::path(
    get,
    path = "/api/employees/team-mates",
    responses((status = 200, description = "Employees sharing the caller's manager", body = [TeamMemberResponse])),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_team_mates(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let employee = current_employee(pool.get_ref(), &auth).await?;

    let manager_id = employee
        .manager_id
        .ok_or_else(|| ApiError::NotFound("Employee has no manager assigned".into()))?;

    let team = user::employees_of_manager(pool.get_ref(), manager_id).await?;
    Ok(HttpResponse::Ok().json(team))
}
