use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::MySqlPool;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::user::UserResponse;
use crate::models::{PasswordChangeRequest, TeamMemberResponse, UpdateProfileRequest};
use crate::service::user;

/// Manager Profile
#[utoipa::path(
    get,
    path = "/api/managers/profile",
    responses((status = 200, description = "Own profile", body = UserResponse)),
    tag = "Manager",
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

/// Update Manager Profile
#[utoipa::path(
    put,
    path = "/api/managers/profile",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Profile updated", body = UserResponse)),
    tag = "Manager",
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

/// Change Manager Password
#[utoipa::path(
    post,
    path = "/api/managers/change-password",
    request_body = PasswordChangeRequest,
    responses((status = 200, description = "Password changed")),
    tag = "Manager",
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

/// Own Team
#[utoipa::path(
    get,
    path = "/api/managers/team",
    responses((status = 200, description = "Employees reporting to the caller", body = [TeamMemberResponse])),
    tag = "Manager",
    security(("bearer_auth" = []))
)]
pub async fn get_team(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager_or_admin()?;

    let manager = user::get_by_email(pool.get_ref(), &auth.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Manager not found".into()))?;

    let team = user::employees_of_manager(pool.get_ref(), manager.id).await?;
    Ok(HttpResponse::Ok().json(team))
}

/// Team Member Detail
#[utoipa::path(
    get,
    path = "/api/managers/team/{employee_id}",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Team member", body = TeamMemberResponse),
        (status = 404, description = "Not in this manager's team"),
    ),
    tag = "Manager",
    security(("bearer_auth" = []))
)]
pub async fn get_team_member(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_manager_or_admin()?;

    let employee_id = path.into_inner();

    let manager = user::get_by_email(pool.get_ref(), &auth.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Manager not found".into()))?;

    let member = user::employees_of_manager(pool.get_ref(), manager.id)
        .await?
        .into_iter()
        .find(|m| m.id == employee_id)
        .ok_or_else(|| {
            ApiError::NotFound("Employee not found or does not belong to this manager".into())
        })?;

    Ok(HttpResponse::Ok().json(member))
}
