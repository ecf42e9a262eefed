use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane@company.com", format = "email", value_type = String)]
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "jane@company.com", format = "email", value_type = String)]
    pub email: String,
    pub role: Role,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = 1)]
    pub user_id: u64,
}

/// Body of an initiate-registration request. The target role is fixed by the
/// endpoint, never chosen by the caller.
#[derive(Deserialize, ToSchema)]
pub struct OtpRequest {
    #[schema(example = "invitee@company.com", format = "email", value_type = String)]
    pub email: String,
    /// Required when inviting an employee; ignored for managers.
    #[schema(example = 7)]
    pub manager_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct OtpVerificationRequest {
    #[schema(example = "invitee@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "482913")]
    pub otp: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Only applied when the caller is an employee.
    pub department: Option<String>,
}

/// Team-listing row: an employee plus its manager's display name, resolved
/// in one JOIN to avoid a lookup per row.
#[derive(Serialize, ToSchema, sqlx::FromRow)]
pub struct TeamMemberResponse {
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = "emp@company.com", format = "email", value_type = String)]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "EMP4F7A2C9B")]
    pub employee_code: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
    #[schema(example = 7)]
    pub manager_id: Option<u64>,
    #[schema(example = "Jane Doe")]
    pub manager_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Email address of the token holder.
    pub sub: String,
    pub role: u8,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
